use crate::error::{RestyleError, Result};
use std::env;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_VAR)
            .or_else(|_| env::var(FALLBACK_API_KEY_VAR))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = env::var("GEMINI_MODEL").ok();
        let base_url = env::var("GEMINI_BASE_URL").ok();

        GeminiConfig {
            api_key,
            model,
            base_url,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The API key, or `ConfigurationMissing` when none was provided.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            RestyleError::ConfigurationMissing(format!(
                "{} (or {}) must be set",
                API_KEY_VAR, FALLBACK_API_KEY_VAR
            ))
        })
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub port: Option<u16>,
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            gemini: GeminiConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, gemini: GeminiConfig) -> Self {
        self.gemini = gemini;
        self
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = GeminiConfig::new();
        let err = config.api_key().unwrap_err();
        assert!(matches!(err, RestyleError::ConfigurationMissing(_)));
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::new().with_api_key("test-key");
        assert_eq!(config.api_key().unwrap(), "test-key");
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(Config::new().port(), DEFAULT_PORT);
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new().with_port(9000).with_gemini(
            GeminiConfig::new()
                .with_model("gemini-3-pro-image-preview")
                .with_base_url("http://localhost:8081/v1beta/"),
        );
        assert_eq!(config.port(), 9000);
        assert_eq!(config.gemini.model(), "gemini-3-pro-image-preview");
        assert_eq!(config.gemini.base_url(), "http://localhost:8081/v1beta");
    }
}
