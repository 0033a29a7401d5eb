mod domain;
pub use domain::*;

pub mod prelude {
    pub use crate::domain::{ExitStatus, Plugin, PluginKind, PluginSpec, RunOutcome};
}
