use async_trait::async_trait;
use thiserror::Error;

/// Exit notification for one container, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitEvent {
    pub status_code: i64,
    /// Engine-reported fault, when the engine knows more than the code.
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Api(#[from] bollard::errors::Error),
    #[error("{0}")]
    Other(String),
}

/// Container engine operations the lifecycle manager needs, abstracted so
/// the engine can be substituted in tests.
///
/// The handle is stateless with respect to any single container and may be
/// shared across sessions; a container id belongs to exactly one session.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Pulls `image`. Progress output is not semantically significant
    /// beyond completion or error.
    async fn pull_image(&self, image: &str) -> Result<(), EngineError>;

    /// Creates a container bound to `image` running `cmd`, with stdout and
    /// stderr capture enabled. Returns the engine's container id.
    async fn create_container(&self, image: &str, cmd: &[String]) -> Result<String, EngineError>;

    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    /// Resolves when the container stops running.
    async fn wait_for_exit(&self, id: &str) -> Result<ExitEvent, EngineError>;

    /// Best-effort forced termination.
    async fn kill_container(&self, id: &str, signal: &str) -> Result<(), EngineError>;

    /// Fetches combined stdout/stderr of the container.
    async fn fetch_logs(&self, id: &str) -> Result<String, EngineError>;

    /// Force-removes the container. Best-effort; callers log failures and
    /// move on.
    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted engine double recording every call it sees.
    #[derive(Default)]
    pub struct MockEngine {
        pub calls: Mutex<Vec<&'static str>>,
        pub pull_error: Option<String>,
        pub create_error: Option<String>,
        pub start_error: Option<String>,
        /// Delay before the exit event is delivered.
        pub exit_after: Option<Duration>,
        pub exit: Option<ExitEvent>,
        pub wait_error: Option<String>,
        pub logs: Option<String>,
        pub logs_error: Option<String>,
        pub kills: AtomicUsize,
        pub removals: AtomicUsize,
    }

    impl MockEngine {
        pub fn exiting_with(status_code: i64) -> Self {
            Self {
                exit: Some(ExitEvent {
                    status_code,
                    message: None,
                }),
                logs: Some("I haz logs.".to_string()),
                ..Default::default()
            }
        }

        pub fn recorded_calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl Engine for MockEngine {
        async fn pull_image(&self, _image: &str) -> Result<(), EngineError> {
            self.record("pull");
            match &self.pull_error {
                Some(e) => Err(EngineError::Other(e.clone())),
                None => Ok(()),
            }
        }

        async fn create_container(
            &self,
            _image: &str,
            _cmd: &[String],
        ) -> Result<String, EngineError> {
            self.record("create");
            match &self.create_error {
                Some(e) => Err(EngineError::Other(e.clone())),
                None => Ok("new-container-id".to_string()),
            }
        }

        async fn start_container(&self, _id: &str) -> Result<(), EngineError> {
            self.record("start");
            match &self.start_error {
                Some(e) => Err(EngineError::Other(e.clone())),
                None => Ok(()),
            }
        }

        async fn wait_for_exit(&self, _id: &str) -> Result<ExitEvent, EngineError> {
            self.record("wait");
            if let Some(delay) = self.exit_after {
                tokio::time::sleep(delay).await;
            }
            if let Some(e) = &self.wait_error {
                return Err(EngineError::Other(e.clone()));
            }
            match &self.exit {
                Some(event) => Ok(event.clone()),
                // No scripted exit: hang until the deadline decides.
                None => std::future::pending().await,
            }
        }

        async fn kill_container(&self, _id: &str, _signal: &str) -> Result<(), EngineError> {
            self.record("kill");
            self.kills.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fetch_logs(&self, _id: &str) -> Result<String, EngineError> {
            self.record("logs");
            if let Some(e) = &self.logs_error {
                return Err(EngineError::Other(e.clone()));
            }
            Ok(self.logs.clone().unwrap_or_default())
        }

        async fn remove_container(&self, _id: &str) -> Result<(), EngineError> {
            self.record("remove");
            self.removals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
