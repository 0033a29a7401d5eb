use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use plugrun_core::{Store, StoreError};
use plugrun_model::Plugin;

/// In-memory Plugin Directory for tests and embedded use.
#[derive(Default)]
pub struct MemoryStore {
    plugins: Mutex<HashMap<String, Plugin>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pre-populated store.
    pub fn with_plugins(plugins: impl IntoIterator<Item = Plugin>) -> Self {
        Self {
            plugins: Mutex::new(
                plugins
                    .into_iter()
                    .map(|p| (p.name.clone(), p))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create(&self, plugin: &Plugin) -> Result<(), StoreError> {
        plugin.validate().map_err(StoreError::InvalidPlugin)?;
        let mut plugins = self.plugins.lock().await;
        if plugins.contains_key(&plugin.name) {
            return Err(StoreError::AlreadyExists(plugin.name.clone()));
        }
        plugins.insert(plugin.name.clone(), plugin.clone());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Plugin, StoreError> {
        self.plugins
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.plugins
            .lock()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<Plugin>, StoreError> {
        let plugins = self.plugins.lock().await;
        let mut all: Vec<Plugin> = plugins.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepopulated_lookup() {
        let store = MemoryStore::with_plugins([
            Plugin::container("echo1", "demo/echo"),
            Plugin::bare("tool", "/opt"),
        ]);
        assert_eq!(store.get("echo1").await.unwrap().name, "echo1");
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = MemoryStore::with_plugins([
            Plugin::bare("zed", "/opt"),
            Plugin::bare("abc", "/opt"),
        ]);
        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["abc", "zed"]);
    }
}
