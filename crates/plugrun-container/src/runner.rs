use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use plugrun_core::{Runner, RunnerError, Store};
use plugrun_model::{PluginSpec, RunOutcome};

use crate::engine::Engine;
use crate::session::Session;

/// Configuration for the container runner.
#[derive(Debug, Clone)]
pub struct ContainerRunnerConfig {
    /// Hard deadline for one container run. The deadline cannot be
    /// disabled; a zero value is rejected at construction.
    pub max_command_runtime: Duration,
}

impl Default for ContainerRunnerConfig {
    fn default() -> Self {
        Self {
            max_command_runtime: Duration::from_secs(15),
        }
    }
}

/// Chain link handling container-typed plugins.
///
/// Looks the plugin up in the directory; container plugins run through a
/// fresh lifecycle [`Session`], anything else is forwarded verbatim to the
/// next link.
pub struct ContainerRunner {
    store: Arc<dyn Store>,
    engine: Arc<dyn Engine>,
    cfg: ContainerRunnerConfig,
    next: Option<Arc<dyn Runner>>,
}

impl std::fmt::Debug for ContainerRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRunner")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl ContainerRunner {
    pub fn new(
        store: Arc<dyn Store>,
        engine: Arc<dyn Engine>,
        cfg: ContainerRunnerConfig,
    ) -> Result<Self, RunnerError> {
        if cfg.max_command_runtime.is_zero() {
            return Err(RunnerError::InvalidConfig(
                "max command runtime must be positive".to_string(),
            ));
        }
        Ok(Self {
            store,
            engine,
            cfg,
            next: None,
        })
    }

    /// Chains a successor consulted for plugins this runner cannot handle.
    pub fn with_next(mut self, next: Arc<dyn Runner>) -> Self {
        self.next = Some(next);
        self
    }
}

#[async_trait]
impl Runner for ContainerRunner {
    fn name(&self) -> &'static str {
        "container"
    }

    async fn run(&self, plugin: &str, args: &[String]) -> Result<RunOutcome, RunnerError> {
        let record = self.store.get(plugin).await?;

        let image = match record.spec {
            PluginSpec::Container { image } => image,
            _ => {
                info!(target: "plugrun.container", name = %plugin, "not a container plugin, calling next in line");
                return match &self.next {
                    Some(next) => next.run(plugin, args).await,
                    None => Err(RunnerError::NoHandlerConfigured(plugin.to_string())),
                };
            }
        };

        Session::new(
            self.engine.clone(),
            plugin,
            image,
            args,
            self.cfg.max_command_runtime,
        )
        .run()
        .await
    }
}
