use async_trait::async_trait;

use plugrun_model::Plugin;

use crate::error::StoreError;

/// The Plugin Directory: persistent lookup and registration of plugin
/// records.
///
/// `get` must hand back a fully-populated record or fail; runners never
/// partially trust a lookup result.
#[async_trait]
pub trait Store: Send + Sync {
    /// Registers a new plugin. Fails with [`StoreError::AlreadyExists`] on
    /// a duplicate name and [`StoreError::InvalidPlugin`] on an
    /// under-populated record.
    async fn create(&self, plugin: &Plugin) -> Result<(), StoreError>;

    /// Resolves a plugin name to its record.
    async fn get(&self, name: &str) -> Result<Plugin, StoreError>;

    /// Removes a plugin by name.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;

    /// Lists all registered plugins.
    async fn list(&self) -> Result<Vec<Plugin>, StoreError>;
}
