//! Application configuration and secrets.
//!
//! `config.toml` holds ordinary settings; `secret.json` holds the API key.
//! Both files are optional. A missing credential is not reported here: the
//! assistant client refuses to send anything with an empty key.

use std::path::Path;

use serde::{Deserialize, Serialize};

use blueprint_core::Result;
use blueprint_core::artifact::DEFAULT_VIEWER_BASE;

use crate::paths::BlueprintPaths;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable that overrides the API key from secret.json.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini model name.
    pub model: String,
    /// Base URL of the PlantUML server used for diagram links.
    pub viewer_base_url: String,
    /// Where exported artifacts are written.
    pub output_dir: String,
    /// Per-request timeout. `None` leaves it to the HTTP client.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            viewer_base_url: DEFAULT_VIEWER_BASE.to_string(),
            output_dir: ".".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads `config.toml` from the given path, falling back to defaults when
    /// the file does not exist.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        tracing::info!("[Config] Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub async fn load(paths: &BlueprintPaths) -> Result<Self> {
        Self::load_from(&paths.config_file()?).await
    }
}

/// Root structure of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl SecretConfig {
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn load(paths: &BlueprintPaths) -> Result<Self> {
        Self::load_from(&paths.secret_file()?).await
    }

    /// Picks the API key: explicit value, then the environment, then the file.
    /// Blank values are skipped. Returns an empty string when none is set.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> String {
        self.pick_api_key(explicit, std::env::var(API_KEY_ENV).ok())
    }

    fn pick_api_key(&self, explicit: Option<&str>, env: Option<String>) -> String {
        fn non_blank(key: &str) -> Option<String> {
            let key = key.trim();
            (!key.is_empty()).then(|| key.to_string())
        }

        explicit
            .and_then(non_blank)
            .or_else(|| env.as_deref().and_then(non_blank))
            .or_else(|| self.gemini.as_ref().and_then(|g| non_blank(&g.api_key)))
            .unwrap_or_default()
    }

    /// Model override stored next to the key, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.gemini.as_ref().and_then(|g| g.model_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml"))
            .await
            .unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "model = \"gemini-2.5-pro\"\nrequest_timeout_secs = 90\n")
            .await
            .unwrap();

        let config = AppConfig::load_from(&path).await.unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.request_timeout_secs, Some(90));
        assert_eq!(config.viewer_base_url, DEFAULT_VIEWER_BASE);
    }

    #[tokio::test]
    async fn test_invalid_config_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "model = [").await.unwrap();

        let err = AppConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, blueprint_core::BlueprintError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_secret_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        tokio::fs::write(
            &path,
            r#"{"gemini": {"api_key": " key-123 ", "model_name": "gemini-2.0-flash"}}"#,
        )
        .await
        .unwrap();

        let secrets = SecretConfig::load_from(&path).await.unwrap();

        assert_eq!(secrets.resolve_api_key(Some("explicit")), "explicit");
        assert_eq!(secrets.model_name(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_explicit_key_wins() {
        let secrets = SecretConfig {
            gemini: Some(GeminiSecret {
                api_key: "from-file".into(),
                model_name: None,
            }),
        };
        assert_eq!(secrets.resolve_api_key(Some("flag")), "flag");
    }

    #[test]
    fn test_blank_keys_fall_through_to_the_file() {
        let secrets = SecretConfig {
            gemini: Some(GeminiSecret {
                api_key: " from-file ".into(),
                model_name: None,
            }),
        };
        assert_eq!(secrets.pick_api_key(None, Some(String::new())), "from-file");
        assert_eq!(secrets.pick_api_key(Some("  "), Some(" \t".into())), "from-file");
        assert_eq!(secrets.pick_api_key(None, Some("from-env".into())), "from-env");
        assert_eq!(SecretConfig::default().pick_api_key(None, Some("".into())), "");
    }
}
