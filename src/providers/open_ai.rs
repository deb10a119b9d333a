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

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> Result<Self, ReceiptError> {
        let api_key = resolve_api_key(config, "OPENAI_API_KEY", "OpenAI")?;

        Ok(OpenAIProvider {
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
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<ProviderReply, ReceiptError> {
        let data_url = format!(
            "data:{};base64,{}",
            request.mime_type.as_str(),
            request.image_data
        );

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": request.model,
                "max_tokens": request.max_tokens,
                "messages": [
                    {
                        "role": "user",
                        "content": [
                            {"type": "image_url", "image_url": {"url": data_url}},
                            {"type": "text", "text": request.instruction}
                        ]
                    }
                ]
            }))
            .send()
            .await?;

        let (status, response_body) =
            read_json_body(response, "OpenAI", self.display_name()).await?;
        debug!("OpenAI response: {:?}", response_body);

        if let Some(error) = response_body.get("error") {
            // Errors are usually objects but some proxies send a bare string
            let message = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            let kind = error["type"].as_str().unwrap_or("unknown");
            return Err(ReceiptError::Provider {
                provider: "OpenAI".to_string(),
                kind: kind.to_string(),
                message: message.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ReceiptError::Provider {
                provider: "OpenAI".to_string(),
                kind: status.to_string(),
                message: response_body.to_string(),
            });
        }

        let message = &response_body["choices"][0]["message"];
        if message.is_null() {
            return Err(ReceiptError::UnexpectedFormat(
                self.display_name().to_string(),
            ));
        }

        match message["content"].as_str() {
            Some(text) => Ok(ProviderReply::Text(text.to_string())),
            None if message.get("refusal").is_some_and(|r| !r.is_null()) => {
                Ok(ProviderReply::NonText {
                    kind: "refusal".to_string(),
                })
            }
            None if message.get("tool_calls").is_some() => Ok(ProviderReply::NonText {
                kind: "tool_calls".to_string(),
            }),
            None => Ok(ProviderReply::NonText {
                kind: "empty".to_string(),
            }),
        }
    }
}
