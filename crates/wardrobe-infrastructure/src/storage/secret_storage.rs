//! `secret.json` reader.

use std::path::{Path, PathBuf};

use wardrobe_core::config::SecretConfig;
use wardrobe_core::error::{Result, WardrobeError};

use crate::paths::WardrobePaths;

/// Read-only access to the plaintext secrets file.
///
/// Keys are not validated here; an empty key is rejected when the Gemini
/// agent is built.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new(paths: &WardrobePaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| WardrobeError::config(e.to_string()))?;
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parsed secrets, or `None` when the file does not exist yet.
    pub async fn load(&self) -> Result<Option<SecretConfig>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let config = serde_json::from_str(&content).map_err(|e| WardrobeError::Serialization {
            format: "json".to_string(),
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(Some(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
