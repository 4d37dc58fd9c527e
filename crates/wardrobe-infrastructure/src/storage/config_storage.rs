//! `config.toml` storage.

use std::path::PathBuf;

use wardrobe_core::config::WardrobeConfig;
use wardrobe_core::error::{Result, WardrobeError};

use crate::paths::WardrobePaths;

/// Reads and writes [`WardrobeConfig`] as TOML.
///
/// A missing file is not an error: defaults are returned.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(paths: &WardrobePaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| WardrobeError::config(e.to_string()))?;
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> Result<WardrobeConfig> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!("[Config] {:?} not found, using defaults", self.path);
            return Ok(WardrobeConfig::default());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let config: WardrobeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self, config: &WardrobeConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(config)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}
