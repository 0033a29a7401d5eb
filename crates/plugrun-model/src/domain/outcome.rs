use serde::{Deserialize, Serialize};

/// Placeholder output used when the engine cannot hand back logs.
pub const NO_LOGS_AVAILABLE: &str = "no logs available";

/// Terminal state of one plugin invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum ExitStatus {
    /// The work finished with exit code 0.
    Completed,
    /// The work finished with a non-zero exit code or an engine-reported
    /// fault.
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The work was killed for exceeding its maximum runtime.
    TimedOut,
}

impl ExitStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Completed)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExitStatus::TimedOut)
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitStatus::Completed => write!(f, "completed"),
            ExitStatus::Failed {
                code: Some(code), ..
            } => write!(f, "failed (exit code {code})"),
            ExitStatus::Failed {
                message: Some(message),
                ..
            } => write!(f, "failed ({message})"),
            ExitStatus::Failed { .. } => write!(f, "failed"),
            ExitStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Result of one plugin invocation, handed back to the caller and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// Combined stdout/stderr of the work.
    pub output: String,
    /// Which terminal state the invocation reached.
    pub status: ExitStatus,
}

impl RunOutcome {
    pub fn completed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status: ExitStatus::Completed,
        }
    }
}
