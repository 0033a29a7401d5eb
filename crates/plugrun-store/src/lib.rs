mod json;
pub use json::JsonStore;

mod memory;
pub use memory::MemoryStore;

pub mod prelude {
    pub use crate::json::JsonStore;
    pub use crate::memory::MemoryStore;
    pub use plugrun_core::{Store, StoreError};
}
