use thiserror::Error;

/// Errors that can occur while acquiring or analyzing a receipt
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// No API key was configured for the selected provider
    #[error("{provider} API key not configured")]
    MissingCredential { provider: String },

    /// The analyzer was built without a usable provider
    #[error("{0}")]
    NotConfigured(String),

    /// Network or HTTP client failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with an error payload or a non-success status
    #[error("{provider} API error ({kind}): {message}")]
    Provider {
        provider: String,
        kind: String,
        message: String,
    },

    /// The provider reply did not have the expected structure
    #[error("Unexpected response format from {0}")]
    UnexpectedFormat(String),

    /// Provider name is not one of the supported providers
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Provider exists in configuration but is switched off
    #[error("Provider '{0}' is not enabled in configuration")]
    ProviderDisabled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Failed to read an image from disk
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}
