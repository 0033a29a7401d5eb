use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use plugrun_core::{Store, StoreError};
use plugrun_model::Plugin;

const STORE_FILE: &str = "plugins.json";

/// Plugin Directory backed by a single JSON document on disk.
///
/// All operations take the store lock and re-read the document, so the file
/// stays the source of truth even when several handles exist in one
/// process.
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    /// Opens (and on first use creates) a store under `location`.
    pub fn new(location: impl AsRef<Path>) -> Result<Self, StoreError> {
        let location = location.as_ref();
        std::fs::create_dir_all(location)?;
        Ok(Self {
            path: location.join(STORE_FILE),
            lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> Result<Vec<Plugin>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => {
                serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, plugins: &[Plugin]) -> Result<(), StoreError> {
        let raw =
            serde_json::to_vec_pretty(plugins).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn create(&self, plugin: &Plugin) -> Result<(), StoreError> {
        plugin.validate().map_err(StoreError::InvalidPlugin)?;

        let _guard = self.lock.lock().await;
        let mut plugins = self.load().await?;
        if plugins.iter().any(|p| p.name == plugin.name) {
            return Err(StoreError::AlreadyExists(plugin.name.clone()));
        }
        plugins.push(plugin.clone());
        self.save(&plugins).await?;

        info!(target: "plugrun.store", name = %plugin.name, kind = %plugin.kind(), "registered plugin");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Plugin, StoreError> {
        let _guard = self.lock.lock().await;
        let plugins = self.load().await?;
        debug!(target: "plugrun.store", %name, "looking up plugin");
        plugins
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut plugins = self.load().await?;
        let before = plugins.len();
        plugins.retain(|p| p.name != name);
        if plugins.len() == before {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.save(&plugins).await?;

        info!(target: "plugrun.store", %name, "removed plugin");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Plugin>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }
}
