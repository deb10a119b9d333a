use crate::config::ProviderConfig;
use crate::providers::{
    build_client, read_json_body, resolve_api_key, InferenceRequest, ProviderReply, VisionProvider,
};
use crate::ReceiptError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> Result<Self, ReceiptError> {
        let api_key = resolve_api_key(config, "GOOGLE_API_KEY", "Google")?;

        Ok(GoogleProvider {
            client: build_client(timeout),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        GoogleProvider {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl VisionProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn display_name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<ProviderReply, ReceiptError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {
                            "inline_data": {
                                "mime_type": request.mime_type.as_str(),
                                "data": request.image_data
                            }
                        },
                        {"text": request.instruction}
                    ]
                }],
                "generationConfig": {
                    "maxOutputTokens": request.max_tokens
                }
            }))
            .send()
            .await?;

        let (status, response_body) =
            read_json_body(response, "Google", self.display_name()).await?;
        debug!("Google Gemini response: {:?}", response_body);

        if let Some(error) = response_body.get("error") {
            let status_name = error["status"].as_str().unwrap_or("unknown");
            let message = error["message"].as_str().unwrap_or("Unknown error");
            return Err(ReceiptError::Provider {
                provider: "Google".to_string(),
                kind: status_name.to_string(),
                message: message.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ReceiptError::Provider {
                provider: "Google".to_string(),
                kind: status.to_string(),
                message: response_body.to_string(),
            });
        }

        let candidate = &response_body["candidates"][0];
        if candidate.is_null() {
            return Err(ReceiptError::UnexpectedFormat(
                self.display_name().to_string(),
            ));
        }

        let part = &candidate["content"]["parts"][0];
        match part["text"].as_str() {
            Some(text) => Ok(ProviderReply::Text(text.to_string())),
            None => {
                // No text part: report the part key, or the finish reason when blocked
                let kind = part
                    .as_object()
                    .and_then(|object| object.keys().next().cloned())
                    .or_else(|| candidate["finishReason"].as_str().map(String::from))
                    .unwrap_or_else(|| "empty".to_string());
                Ok(ProviderReply::NonText { kind })
            }
        }
    }
}
