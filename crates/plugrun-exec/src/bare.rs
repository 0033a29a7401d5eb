use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use plugrun_core::{Runner, RunnerError, Store};
use plugrun_model::{ExitStatus, PluginSpec, RunOutcome};

/// Terminal chain link running a plugin as a local subprocess.
///
/// The plugin's `location` is the directory holding the executable; the
/// executable file is named after the plugin. No timeout and no lifecycle
/// state beyond process start and exit.
pub struct BareRunner {
    store: Arc<dyn Store>,
    next: Option<Arc<dyn Runner>>,
}

impl BareRunner {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store, next: None }
    }

    /// Chains a successor consulted for plugins this runner cannot handle.
    pub fn with_next(mut self, next: Arc<dyn Runner>) -> Self {
        self.next = Some(next);
        self
    }

    async fn run_local(&self, plugin: &str, program: std::path::PathBuf, args: &[String])
    -> Result<RunOutcome, RunnerError> {
        debug!(target: "plugrun.exec", name = %plugin, program = %program.display(), ?args, "spawn");

        let output = Command::new(&program)
            .args(args)
            .output()
            .await
            .map_err(|e| RunnerError::Spawn {
                program: program.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        let combined = String::from_utf8_lossy(&combined).into_owned();

        let status = if output.status.success() {
            ExitStatus::Completed
        } else {
            ExitStatus::Failed {
                code: output.status.code().map(i64::from),
                message: output
                    .status
                    .code()
                    .is_none()
                    .then(|| "terminated by signal".to_string()),
            }
        };

        Ok(RunOutcome {
            output: combined,
            status,
        })
    }
}

#[async_trait]
impl Runner for BareRunner {
    fn name(&self) -> &'static str {
        "bare"
    }

    async fn run(&self, plugin: &str, args: &[String]) -> Result<RunOutcome, RunnerError> {
        let record = self.store.get(plugin).await?;

        let location = match record.spec {
            PluginSpec::Bare { location } => location,
            _ => {
                info!(target: "plugrun.exec", name = %plugin, "not a bare plugin, calling next in line");
                return match &self.next {
                    Some(next) => next.run(plugin, args).await,
                    None => Err(RunnerError::NoHandlerConfigured(plugin.to_string())),
                };
            }
        };

        info!(target: "plugrun.exec", name = %plugin, "running bare plugin");
        self.run_local(plugin, location.join(plugin), args).await
    }
}
