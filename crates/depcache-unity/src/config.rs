//! Project settings file (`depcache.yaml`).
//!
//! ```yaml
//! cache:
//!   properties-per-checkpoint: 100
//!   include-prefix: Assets/
//!   exclude-filters:
//!     - "Assets/Plugins/**"
//!     - "**/*.fbx"
//!   ignored-properties:
//!     - m_Script
//! ```
//!
//! Older settings kept the filters as one comma-separated string; it is
//! still accepted as `exclude-filter-list` and merged into `exclude-filters`.

use crate::error::{Error, Result};
use depcache::CacheSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the settings file at the project root.
pub const CONFIG_FILE_NAME: &str = "depcache.yaml";

/// Contents of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Build settings
    pub cache: CacheSettings,

    /// Comma-separated exclude filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_filter_list: Option<String>,
}

impl ProjectConfig {
    /// Load the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// holds settings that cannot drive a build.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.settings().validate()?;
        debug!(path = %path.display(), "Loaded project config");
        Ok(config)
    }

    /// Load the explicit settings file, or `<root>/depcache.yaml` if present,
    /// or fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be loaded. An
    /// explicit path that does not exist is an error too.
    pub async fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path).await;
        }
        let path = Self::default_path(root);
        if fs::try_exists(&path).await? {
            Self::load(&path).await
        } else {
            debug!(root = %root.display(), "No project config, using defaults");
            Ok(Self::default())
        }
    }

    /// Write the settings file to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Location of the settings file for a project root.
    #[must_use]
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Effective build settings, with the legacy filter list merged in.
    #[must_use]
    pub fn settings(&self) -> CacheSettings {
        match &self.exclude_filter_list {
            Some(list) => self.cache.clone().with_filter_list(list),
            None => self.cache.clone(),
        }
    }
}
