use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptionsBuilder, KillContainerOptionsBuilder,
    LogsOptionsBuilder, RemoveContainerOptionsBuilder, StartContainerOptions,
    WaitContainerOptions,
};
use futures_util::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::engine::{Engine, EngineError, ExitEvent};

/// Splits an image reference into the name the registry API wants and an
/// optional tag.
///
/// A colon only separates a tag when it comes after the last slash, so
/// registry ports (`localhost:5000/demo/echo`) stay part of the name.
/// Digest references (`name@sha256:...`) are pulled whole, without a tag.
fn split_image_reference(image: &str) -> (&str, Option<&str>) {
    if image.contains('@') {
        return (image, None);
    }
    match image.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name, Some(tag)),
        _ => (image, Some("latest")),
    }
}

/// Production [`Engine`] backed by the Docker API.
///
/// The client is stateless per container and safe to share across sessions;
/// the composition root builds one and injects it into runners.
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connects using the environment's defaults (socket path, API version).
    pub fn connect() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl Engine for DockerEngine {
    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        let (from_image, tag) = split_image_reference(image);
        let mut options = CreateImageOptionsBuilder::new().from_image(from_image);
        if let Some(tag) = tag {
            options = options.tag(tag);
        }
        // Progress frames are drained; only completion or error matters.
        self.docker
            .create_image(Some(options.build()), None, None)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(())
    }

    async fn create_container(&self, image: &str, cmd: &[String]) -> Result<String, EngineError> {
        let body = ContainerCreateBody {
            image: Some(image.to_string()),
            cmd: Some(cmd.to_vec()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..ContainerCreateBody::default()
        };
        let created = self
            .docker
            .create_container(None::<CreateContainerOptions>, body)
            .await?;
        if !created.warnings.is_empty() {
            debug!(target: "plugrun.container", warnings = ?created.warnings, "container created with warnings");
        }
        Ok(created.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;
        Ok(())
    }

    async fn wait_for_exit(&self, id: &str) -> Result<ExitEvent, EngineError> {
        let mut wait = self
            .docker
            .wait_container(id, None::<WaitContainerOptions>);
        match wait.next().await {
            Some(Ok(response)) => Ok(ExitEvent {
                status_code: response.status_code,
                message: response.error.and_then(|e| e.message),
            }),
            // bollard reports a non-zero exit as an error item carrying the
            // code; that is an exit event, not an engine fault.
            Some(Err(BollardError::DockerContainerWaitError { error, code })) => Ok(ExitEvent {
                status_code: code,
                message: (!error.is_empty()).then_some(error),
            }),
            Some(Err(e)) => Err(e.into()),
            None => Err(EngineError::Other(
                "wait stream closed without an exit event".to_string(),
            )),
        }
    }

    async fn kill_container(&self, id: &str, signal: &str) -> Result<(), EngineError> {
        self.docker
            .kill_container(
                id,
                Some(KillContainerOptionsBuilder::new().signal(signal).build()),
            )
            .await?;
        Ok(())
    }

    async fn fetch_logs(&self, id: &str) -> Result<String, EngineError> {
        let frames: Vec<LogOutput> = self
            .docker
            .logs(
                id,
                Some(LogsOptionsBuilder::new().stdout(true).stderr(true).build()),
            )
            .try_collect()
            .await?;

        let mut combined = Vec::new();
        for frame in frames {
            combined.extend_from_slice(&frame.into_bytes());
        }
        Ok(String::from_utf8_lossy(&combined).into_owned())
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        match self
            .docker
            .remove_container(
                id,
                Some(RemoveContainerOptionsBuilder::new().force(true).build()),
            )
            .await
        {
            Ok(()) => Ok(()),
            // Already gone is as good as removed.
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
