mod anthropic;
mod factory;
mod google;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::RECEIPT_ANALYSIS_PROMPT;

use crate::config::{default_max_tokens, ProviderConfig};
use crate::model::MimeType;
use crate::ReceiptError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// One multimodal request: a single user turn holding an image and an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub model: String,
    /// Ceiling on generated tokens
    pub max_tokens: u32,
    pub mime_type: MimeType,
    /// Base64 image data
    pub image_data: String,
    pub instruction: String,
}

impl InferenceRequest {
    /// Build the receipt analysis request for an encoded image
    pub fn for_receipt(model: impl Into<String>, mime_type: MimeType, image_data: impl Into<String>) -> Self {
        InferenceRequest {
            model: model.into(),
            max_tokens: default_max_tokens(),
            mime_type,
            image_data: image_data.into(),
            instruction: RECEIPT_ANALYSIS_PROMPT.to_string(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// What the provider sent back in its first content part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderReply {
    Text(String),
    /// A content part that is not text (tool use, image, refusal...)
    NonText { kind: String },
}

/// Unified trait for all multimodal inference providers
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Name shown to users in messages (e.g., "Claude")
    fn display_name(&self) -> &str;

    /// Submit one request and return the first content part of the reply
    async fn complete(&self, request: &InferenceRequest) -> Result<ProviderReply, ReceiptError>;
}

pub(crate) fn build_client(timeout: Option<Duration>) -> Client {
    let builder = Client::builder();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder.build().unwrap_or_else(|_| Client::new())
}

/// Resolve the credential: configuration first, then the provider's environment variable.
///
/// `api_key_env` in the configuration replaces `default_env_var` as the variable consulted.
pub(crate) fn resolve_api_key(
    config: &ProviderConfig,
    default_env_var: &str,
    provider: &str,
) -> Result<String, ReceiptError> {
    let env_var = config.api_key_env.as_deref().unwrap_or(default_env_var);

    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ReceiptError::MissingCredential {
            provider: provider.to_string(),
        })
}

/// Read the response body as JSON, keeping the HTTP status when the body is not JSON
pub(crate) async fn read_json_body(
    response: Response,
    provider: &str,
    display_name: &str,
) -> Result<(StatusCode, Value), ReceiptError> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str(&body) {
        Ok(value) => Ok((status, value)),
        Err(_) if !status.is_success() => Err(ReceiptError::Provider {
            provider: provider.to_string(),
            kind: status.to_string(),
            message: body,
        }),
        Err(e) => {
            debug!("{} returned a non-JSON body: {}", provider, e);
            Err(ReceiptError::UnexpectedFormat(display_name.to_string()))
        }
    }
}
