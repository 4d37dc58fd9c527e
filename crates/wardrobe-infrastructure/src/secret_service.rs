//! Secret service implementation backed by `secret.json`.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use wardrobe_core::config::{GeminiConfig, SecretConfig};
use wardrobe_core::secret::SecretService;

use crate::paths::WardrobePaths;
use crate::storage::SecretStorage;

/// Environment variables consulted before the secret file, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Loads secrets once and caches them.
///
/// An API key found in the environment takes precedence over the file, and
/// a missing file is fine as long as the environment provides a key.
#[derive(Clone)]
pub struct SecretServiceImpl {
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    storage: Arc<SecretStorage>,
    env_vars: Vec<String>,
}

impl SecretServiceImpl {
    pub fn new(paths: &WardrobePaths) -> anyhow::Result<Self> {
        let storage = SecretStorage::new(paths)?;
        Ok(Self::from_storage(storage))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self::from_storage(SecretStorage::with_path(path))
    }

    fn from_storage(storage: SecretStorage) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            storage: Arc::new(storage),
            env_vars: API_KEY_ENV_VARS.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Replaces the environment variables consulted for the API key.
    pub fn with_env_vars(mut self, vars: &[&str]) -> Self {
        self.env_vars = vars.iter().map(|v| v.to_string()).collect();
        self
    }

    fn env_api_key(&self) -> Option<String> {
        self.env_vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }

    fn cached(&self) -> Result<Option<SecretConfig>, String> {
        self.secrets
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| "Secret cache lock poisoned".to_string())
    }

    async fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        if let Some(cached) = self.cached()? {
            return Ok(cached);
        }

        let env_key = self.env_api_key();
        let mut loaded = match self.storage.load().await {
            Ok(Some(config)) => config,
            Ok(None) if env_key.is_some() => {
                tracing::debug!(
                    "[Secret] {} missing, using environment key",
                    self.storage.path().display()
                );
                SecretConfig::default()
            }
            Ok(None) => {
                return Err(format!(
                    "Secret file not found at {}",
                    self.storage.path().display()
                ));
            }
            Err(e) => return Err(format!("Failed to load secret.json: {}", e)),
        };

        if let Some(api_key) = env_key {
            let model_name = loaded.gemini.as_ref().and_then(|g| g.model_name.clone());
            loaded.gemini = Some(GeminiConfig {
                api_key,
                model_name,
            });
        }

        let mut write_lock = self
            .secrets
            .write()
            .map_err(|_| "Secret cache lock poisoned".to_string())?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal().await
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(self.storage.path())
            .await
            .unwrap_or(false)
    }
}
