mod bare;
pub use bare::BareRunner;

pub mod prelude {
    pub use crate::bare::BareRunner;
    pub use plugrun_core::{Runner, RunnerError};
}
