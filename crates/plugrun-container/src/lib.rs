mod engine;
pub use engine::{Engine, EngineError, ExitEvent};

mod docker;
pub use docker::DockerEngine;

mod session;

mod runner;
pub use runner::{ContainerRunner, ContainerRunnerConfig};

pub mod prelude {
    pub use crate::docker::DockerEngine;
    pub use crate::engine::{Engine, EngineError, ExitEvent};
    pub use crate::runner::{ContainerRunner, ContainerRunnerConfig};
}
