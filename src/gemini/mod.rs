pub mod image_client;
pub mod transport;

use crate::{config::GeminiConfig, error::Result};
use std::sync::Arc;

pub use image_client::{ImageClient, REMOVE_BACKGROUND_PROMPT};
pub use transport::{GenerationTransport, HttpTransport};

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
}

impl GeminiClient {
    /// Fails with `ConfigurationMissing` when no API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        log::debug!("Gemini client ready for {}", config.base_url());
        Ok(Self::with_transport(Arc::new(transport), config.model()))
    }

    pub fn with_transport(transport: Arc<dyn GenerationTransport>, model: &str) -> Self {
        Self {
            image_client: ImageClient::new(transport, model),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestyleError;

    #[test]
    fn test_new_without_key_is_fatal_configuration_error() {
        let err = GeminiClient::new(GeminiConfig::new()).err().unwrap();
        assert!(matches!(err, RestyleError::ConfigurationMissing(_)));
    }

    #[test]
    fn test_new_uses_configured_model() {
        let client = GeminiClient::new(
            GeminiConfig::new()
                .with_api_key("test-key")
                .with_model("gemini-3-pro-image-preview"),
        )
        .unwrap();
        assert_eq!(client.image().model(), "gemini-3-pro-image-preview");
    }
}
