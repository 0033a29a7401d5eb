use async_trait::async_trait;

use plugrun_model::RunOutcome;

use crate::error::RunnerError;

/// Capability of running a plugin by name.
///
/// Implementations compose into a linear chain of responsibility: each link
/// either fully handles the request or forwards it unchanged to exactly one
/// successor. The successor, if any, is held by the concrete runner, so new
/// runner kinds slot into an existing chain without touching the others.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Executes the named plugin with the given arguments and returns its
    /// captured output and terminal state.
    async fn run(&self, plugin: &str, args: &[String]) -> Result<RunOutcome, RunnerError>;
}
