use crate::config::ProviderConfig;
use crate::providers::{AnthropicProvider, GoogleProvider, OpenAIProvider, VisionProvider};
use crate::ReceiptError;
use std::sync::Arc;
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Option<Duration>,
    ) -> Result<Arc<dyn VisionProvider>, ReceiptError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(ReceiptError::ProviderDisabled(provider_name.to_string()));
        }

        match provider_name {
            "anthropic" => Ok(Arc::new(AnthropicProvider::new(config, timeout)?)),
            "openai" => Ok(Arc::new(OpenAIProvider::new(config, timeout)?)),
            "google" => Ok(Arc::new(GoogleProvider::new(config, timeout)?)),
            _ => Err(ReceiptError::UnknownProvider(provider_name.to_string())),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["anthropic", "openai", "google"]
    }
}
