use serde::{Deserialize, Serialize};

use crate::preset::Theme;

/// Default Gemini model capable of returning image parts.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Default prefix prepended to downloaded file names.
pub const DEFAULT_DOWNLOAD_PREFIX: &str = "cyberlook-";

/// Contents of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API credentials.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// Contents of `config.toml`.
///
/// Every field has a default so a missing or partial file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WardrobeConfig {
    /// Image model used for every transform call.
    pub model: String,
    /// Overrides the Gemini REST base URL (proxies, tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Theme used for presets and instruction templates.
    pub theme: Theme,
    /// Prefix for downloaded files.
    pub download_prefix: String,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: None,
            theme: Theme::default(),
            download_prefix: DEFAULT_DOWNLOAD_PREFIX.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl WardrobeConfig {
    /// Resolves the model, preferring the one pinned in `secret.json`.
    pub fn resolve_model(&self, secrets: &SecretConfig) -> String {
        secrets
            .gemini
            .as_ref()
            .and_then(|gemini| gemini.model_name.clone())
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: WardrobeConfig = toml::from_str("theme = \"fantasy\"").unwrap();
        assert_eq!(config.theme, Theme::Fantasy);
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.download_prefix, DEFAULT_DOWNLOAD_PREFIX);
    }

    #[test]
    fn test_resolve_model_prefers_secret_model() {
        let config = WardrobeConfig::default();
        let secrets = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "k".to_string(),
                model_name: Some("gemini-custom-image".to_string()),
            }),
        };
        assert_eq!(config.resolve_model(&secrets), "gemini-custom-image");
        assert_eq!(
            config.resolve_model(&SecretConfig::default()),
            DEFAULT_IMAGE_MODEL
        );
    }
}
