mod error;
pub use error::{RunnerError, StoreError};

mod runner;
pub use runner::Runner;

mod store;
pub use store::Store;

pub mod prelude {
    pub use crate::error::{RunnerError, StoreError};
    pub use crate::runner::Runner;
    pub use crate::store::Store;
}
