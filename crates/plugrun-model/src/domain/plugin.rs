use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend category of a plugin, as stored and as spoken by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// A local executable on the filesystem.
    Bare,
    /// A container image run through a container engine.
    Container,
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginKind::Bare => write!(f, "bare"),
            PluginKind::Container => write!(f, "container"),
        }
    }
}

/// Backend-specific payload of a plugin record.
///
/// The payload carries its own kind tag, so a record whose kind disagrees
/// with its payload cannot be constructed or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PluginSpec {
    /// Container image reference, e.g. `demo/echo:latest`.
    Container { image: String },
    /// Directory holding the executable; the executable file is named
    /// after the plugin itself.
    Bare { location: PathBuf },
}

impl PluginSpec {
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginSpec::Container { .. } => PluginKind::Container,
            PluginSpec::Bare { .. } => PluginKind::Bare,
        }
    }
}

/// A named unit of work, backed by either a container image or a local
/// executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Unique caller-supplied key.
    pub name: String,
    /// Backend payload; see [`PluginSpec`].
    #[serde(flatten)]
    pub spec: PluginSpec,
}

impl Plugin {
    pub fn container(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: PluginSpec::Container {
                image: image.into(),
            },
        }
    }

    pub fn bare(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            spec: PluginSpec::Bare {
                location: location.into(),
            },
        }
    }

    pub fn kind(&self) -> PluginKind {
        self.spec.kind()
    }

    /// Checks the record is fully populated. Empty names, images, and
    /// locations are rejected at creation time by the directory.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("plugin name must not be empty".to_string());
        }
        match &self.spec {
            PluginSpec::Container { image } if image.trim().is_empty() => {
                Err(format!("plugin {}: image must not be empty", self.name))
            }
            PluginSpec::Bare { location } if location.as_os_str().is_empty() => {
                Err(format!("plugin {}: location must not be empty", self.name))
            }
            _ => Ok(()),
        }
    }
}
