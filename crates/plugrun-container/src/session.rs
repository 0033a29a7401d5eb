use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use plugrun_core::RunnerError;
use plugrun_model::{ExitStatus, NO_LOGS_AVAILABLE, RunOutcome};

use crate::engine::{Engine, EngineError};

/// One container invocation: pull → create → start → wait-under-deadline →
/// logs → removal.
///
/// A session is built fresh per run, owns its container id exclusively, and
/// is consumed by [`Session::run`]. Nothing referencing the container
/// survives the session.
pub(crate) struct Session {
    engine: Arc<dyn Engine>,
    plugin: String,
    image: String,
    args: Vec<String>,
    max_runtime: Duration,
}

impl Session {
    pub(crate) fn new(
        engine: Arc<dyn Engine>,
        plugin: impl Into<String>,
        image: impl Into<String>,
        args: &[String],
        max_runtime: Duration,
    ) -> Self {
        Self {
            engine,
            plugin: plugin.into(),
            image: image.into(),
            args: args.to_vec(),
            max_runtime,
        }
    }

    /// Drives the session to a terminal state.
    ///
    /// Once a container exists it is removed on every path out of this
    /// function, exactly once; removal failure never overrides the decided
    /// outcome.
    pub(crate) async fn run(self) -> Result<RunOutcome, RunnerError> {
        self.engine
            .pull_image(&self.image)
            .await
            .map_err(|e| RunnerError::ImagePullFailed {
                image: self.image.clone(),
                reason: e.to_string(),
            })?;

        info!(target: "plugrun.container", plugin = %self.plugin, image = %self.image, "creating container");
        let container_id = self
            .engine
            .create_container(&self.image, &self.args)
            .await
            .map_err(|e| RunnerError::ContainerCreateFailed {
                image: self.image.clone(),
                reason: e.to_string(),
            })?;

        let outcome = self.start_and_wait(&container_id).await;
        self.remove(&container_id).await;
        outcome
    }

    async fn start_and_wait(&self, container_id: &str) -> Result<RunOutcome, RunnerError> {
        info!(target: "plugrun.container", plugin = %self.plugin, container_id, "starting container");
        self.engine.start_container(container_id).await.map_err(|e| {
            RunnerError::ContainerStartFailed {
                container_id: container_id.to_string(),
                reason: e.to_string(),
            }
        })?;

        // The one real race in the system: exit notification against the
        // deadline timer, first arrival wins, the loser is abandoned.
        let status = tokio::select! {
            exit = self.engine.wait_for_exit(container_id) => match exit {
                Ok(event) if event.status_code == 0 => ExitStatus::Completed,
                Ok(event) => ExitStatus::Failed {
                    code: Some(event.status_code),
                    message: event.message,
                },
                Err(e) => ExitStatus::Failed {
                    code: None,
                    message: Some(e.to_string()),
                },
            },
            _ = tokio::time::sleep(self.max_runtime) => {
                warn!(target: "plugrun.container", plugin = %self.plugin, container_id, "command timed out");
                self.kill(container_id).await;
                ExitStatus::TimedOut
            }
        };

        let output = match self.engine.fetch_logs(container_id).await {
            Ok(logs) => logs,
            Err(e) => {
                debug!(target: "plugrun.container", container_id, error = %e, "failed to fetch container logs");
                NO_LOGS_AVAILABLE.to_string()
            }
        };

        Ok(RunOutcome { output, status })
    }

    /// Forced kill after the deadline has already decided the outcome. A
    /// failure here is logged, nothing more.
    async fn kill(&self, container_id: &str) {
        if let Err(e) = self.engine.kill_container(container_id, "SIGKILL").await {
            warn!(target: "plugrun.container", container_id, error = %e, "failed to kill container");
        }
    }

    async fn remove(&self, container_id: &str) {
        if let Err(e) = self.engine.remove_container(container_id).await {
            match e {
                EngineError::Unavailable(reason) => {
                    warn!(target: "plugrun.container", container_id, %reason, "failed to remove container")
                }
                other => {
                    debug!(target: "plugrun.container", container_id, error = %other, "failed to remove container")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::Ordering;

    use crate::engine::ExitEvent;
    use crate::engine::mock::MockEngine;

    fn session(engine: Arc<MockEngine>, max_runtime: Duration) -> Session {
        Session::new(
            engine,
            "echo1",
            "demo/echo",
            &["hi".to_string()],
            max_runtime,
        )
    }

    #[tokio::test]
    async fn zero_exit_completes_with_logs() {
        let engine = Arc::new(MockEngine::exiting_with(0));
        let outcome = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.status, ExitStatus::Completed);
        assert_eq!(outcome.output, "I haz logs.");
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
        assert_eq!(engine.kills.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_zero_exit_fails_with_code() {
        let engine = Arc::new(MockEngine::exiting_with(2));
        let outcome = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap();

        assert_eq!(
            outcome.status,
            ExitStatus::Failed {
                code: Some(2),
                message: None
            }
        );
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn engine_fault_during_wait_fails_with_message() {
        let engine = Arc::new(MockEngine {
            wait_error: Some("connection reset".to_string()),
            logs: Some("partial".to_string()),
            ..Default::default()
        });
        let outcome = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap();

        assert!(matches!(
            outcome.status,
            ExitStatus::Failed { code: None, .. }
        ));
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_beats_a_late_exit() {
        // Exit would arrive after 5s; the 1s deadline decides first.
        let engine = Arc::new(MockEngine {
            exit_after: Some(Duration::from_secs(5)),
            exit: Some(ExitEvent {
                status_code: 0,
                message: None,
            }),
            logs: Some(String::new()),
            ..Default::default()
        });
        let outcome = session(engine.clone(), Duration::from_secs(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.status, ExitStatus::TimedOut);
        assert_eq!(engine.kills.load(Ordering::SeqCst), 1);
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_container_times_out() {
        let engine = Arc::new(MockEngine {
            logs: Some(String::new()),
            ..Default::default()
        });
        let outcome = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.status, ExitStatus::TimedOut);
        assert_eq!(engine.kills.load(Ordering::SeqCst), 1);
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_log_fetch_yields_sentinel_not_error() {
        let engine = Arc::new(MockEngine {
            exit: Some(ExitEvent {
                status_code: 0,
                message: None,
            }),
            logs_error: Some("log endpoint broken".to_string()),
            ..Default::default()
        });
        let outcome = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.status, ExitStatus::Completed);
        assert_eq!(outcome.output, NO_LOGS_AVAILABLE);
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pull_failure_creates_nothing() {
        let engine = Arc::new(MockEngine {
            pull_error: Some("registry unreachable".to_string()),
            ..Default::default()
        });
        let err = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::ImagePullFailed { .. }));
        assert_eq!(engine.recorded_calls(), vec!["pull"]);
        assert_eq!(engine.removals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_failure_leaves_nothing_to_remove() {
        let engine = Arc::new(MockEngine {
            create_error: Some("invalid image".to_string()),
            ..Default::default()
        });
        let err = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::ContainerCreateFailed { .. }));
        assert_eq!(engine.removals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn created_but_unstarted_container_is_still_removed() {
        let engine = Arc::new(MockEngine {
            start_error: Some("oom".to_string()),
            ..Default::default()
        });
        let err = session(engine.clone(), Duration::from_secs(15))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::ContainerStartFailed { .. }));
        assert_eq!(engine.removals.load(Ordering::SeqCst), 1);
        assert_eq!(engine.recorded_calls(), vec!["pull", "create", "start", "remove"]);
    }
}
