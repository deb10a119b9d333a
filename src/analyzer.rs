use crate::config::{default_max_tokens, AppConfig};
use crate::model::{AnalysisOutcome, AnalysisResult, MimeType};
use crate::providers::{InferenceRequest, ProviderFactory, ProviderReply, VisionProvider};
use crate::ReceiptError;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Capability handed to the screen controller: turn an encoded image into a result.
///
/// Implementations never fail; every problem is reported through
/// `AnalysisResult::error_message`.
#[async_trait]
pub trait Analyze: Send + Sync {
    async fn analyze(&self, locator: &str, encoded_payload: &str) -> AnalysisResult;
}

/// Sends receipt images to an inference provider and normalizes the reply
pub struct ReceiptAnalyzer {
    provider: Result<Arc<dyn VisionProvider>, String>,
    model: String,
    max_tokens: u32,
}

impl ReceiptAnalyzer {
    pub fn new(provider: Arc<dyn VisionProvider>, model: impl Into<String>) -> Self {
        ReceiptAnalyzer {
            provider: Ok(provider),
            model: model.into(),
            max_tokens: default_max_tokens(),
        }
    }

    /// An analyzer whose every call fails fast with the given configuration problem
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        ReceiptAnalyzer {
            provider: Err(reason.into()),
            model: String::new(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the analyzer for the configured default provider.
    ///
    /// The credential is resolved once here. A missing credential is not an
    /// error at startup: it is logged and every later call fails fast.
    pub fn from_config(config: &AppConfig) -> Result<Self, ReceiptError> {
        let provider_name = &config.default_provider;
        let provider_config = config
            .provider_config(provider_name)
            .ok_or_else(|| ReceiptError::UnknownProvider(provider_name.clone()))?;

        match ProviderFactory::create(
            provider_name,
            &provider_config,
            Some(Duration::from_secs(config.timeout)),
        ) {
            Ok(provider) => {
                info!(
                    "Using {} with model {}",
                    provider.provider_name(),
                    provider_config.model
                );
                Ok(Self::new(provider, provider_config.model).with_max_tokens(provider_config.max_tokens))
            }
            Err(e @ ReceiptError::MissingCredential { .. }) => {
                warn!("{}; receipt analysis will not be available", e);
                Ok(Self::unconfigured(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_ok()
    }

    /// Run one analysis and report which of the three outcomes occurred
    pub async fn analyze_outcome(&self, locator: &str, encoded_payload: &str) -> AnalysisOutcome {
        match self.request(locator, encoded_payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error analyzing receipt: {}", e);
                AnalysisOutcome::Failure(e.to_string())
            }
        }
    }

    async fn request(
        &self,
        locator: &str,
        encoded_payload: &str,
    ) -> Result<AnalysisOutcome, ReceiptError> {
        let provider = match &self.provider {
            Ok(provider) => provider,
            Err(reason) => return Err(ReceiptError::NotConfigured(reason.clone())),
        };

        let mime_type = MimeType::from_locator(locator);
        let request = InferenceRequest::for_receipt(&self.model, mime_type, encoded_payload)
            .with_max_tokens(self.max_tokens);

        debug!(
            "Sending {} receipt ({} base64 chars) to {}",
            mime_type.as_str(),
            encoded_payload.len(),
            provider.provider_name()
        );

        match provider.complete(&request).await? {
            ProviderReply::Text(text) => Ok(parse_reply(provider.display_name(), text)),
            ProviderReply::NonText { kind } => {
                debug!("Received non-text content block: {}", kind);
                Err(ReceiptError::UnexpectedFormat(
                    provider.display_name().to_string(),
                ))
            }
        }
    }
}

/// Parse model text strictly as JSON shaped like `AnalysisResult`
fn parse_reply(display_name: &str, text: String) -> AnalysisOutcome {
    match serde_json::from_str::<AnalysisResult>(&text) {
        Ok(result) => AnalysisOutcome::Parsed(result),
        Err(e) => {
            warn!("Failed to parse {} response as JSON: {}", display_name, e);
            AnalysisOutcome::ParseFailure {
                provider: display_name.to_string(),
                raw_text: text,
            }
        }
    }
}

#[async_trait]
impl Analyze for ReceiptAnalyzer {
    async fn analyze(&self, locator: &str, encoded_payload: &str) -> AnalysisResult {
        self.analyze_outcome(locator, encoded_payload).await.into()
    }
}
