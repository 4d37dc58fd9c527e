//! Unified path management for wardrobe configuration files.
//!
//! ```text
//! ~/.config/wardrobe/          # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # Gemini API key
//! └── logs/                    # Application logs
//!     └── wardrobe.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use wardrobe_core::config::{DEFAULT_IMAGE_MODEL, GeminiConfig, SecretConfig};

const APP_DIR: &str = "wardrobe";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home/config directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves wardrobe paths, either under the platform config directory or
/// under an explicit base directory (tests, portable installs).
#[derive(Debug, Clone, Default)]
pub struct WardrobePaths {
    base: Option<PathBuf>,
}

impl WardrobePaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/wardrobe/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// On Unix the created file is restricted to mode 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_IMAGE_MODEL.to_string()),
            }),
        };

        let template_json = serde_json::to_string_pretty(&template_config)
            .map_err(std::io::Error::other)?;

        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        tracing::info!("[Paths] Created secret template at {:?}", secret_path);
        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_under_base() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WardrobePaths::new(Some(temp_dir.path()));
        assert_eq!(paths.config_file().unwrap(), temp_dir.path().join("config.toml"));
        assert_eq!(paths.secret_file().unwrap(), temp_dir.path().join("secret.json"));
        assert_eq!(paths.logs_dir().unwrap(), temp_dir.path().join("logs"));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WardrobePaths::new(Some(&temp_dir.path().join("nested")));

        let path = paths.ensure_secret_file().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: SecretConfig = serde_json::from_str(&content).unwrap();
        let gemini = parsed.gemini.unwrap();
        assert!(gemini.api_key.is_empty());
        assert_eq!(gemini.model_name.as_deref(), Some(DEFAULT_IMAGE_MODEL));

        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
