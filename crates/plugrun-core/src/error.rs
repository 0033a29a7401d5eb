use thiserror::Error;

/// Failures of the Plugin Directory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plugin not found: {0}")]
    NotFound(String),
    #[error("plugin already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid plugin record: {0}")]
    InvalidPlugin(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("corrupt store document: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Failures of a runner invocation.
///
/// Resolution and engine-phase problems live here; the outcome of work that
/// actually ran (non-zero exit, timeout) is data on `RunOutcome`, not an
/// error.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    #[error("no next runner configured for plugin {0}")]
    NoHandlerConfigured(String),

    #[error("invalid runner configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to pull image {image}: {reason}")]
    ImagePullFailed { image: String, reason: String },

    #[error("failed to create container from image {image}: {reason}")]
    ContainerCreateFailed { image: String, reason: String },

    #[error("failed to start container {container_id}: {reason}")]
    ContainerStartFailed {
        container_id: String,
        reason: String,
    },

    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RunnerError {
    /// A missing plugin is a resolution error in the chain's vocabulary;
    /// everything else from the directory passes through wrapped.
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => RunnerError::PluginNotFound(name),
            other => RunnerError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_plugin_not_found() {
        let err: RunnerError = StoreError::NotFound("missing".to_string()).into();
        assert!(matches!(err, RunnerError::PluginNotFound(name) if name == "missing"));
    }

    #[test]
    fn other_store_errors_stay_wrapped() {
        let err: RunnerError = StoreError::Io("disk gone".to_string()).into();
        assert!(matches!(err, RunnerError::Store(_)));
    }

    #[test]
    fn no_handler_is_not_plugin_not_found() {
        let err = RunnerError::NoHandlerConfigured("tool".to_string());
        assert!(!matches!(err, RunnerError::PluginNotFound(_)));
        assert_eq!(err.to_string(), "no next runner configured for plugin tool");
    }
}
