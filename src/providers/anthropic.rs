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

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> Result<Self, ReceiptError> {
        let api_key = resolve_api_key(config, "ANTHROPIC_API_KEY", "Anthropic")?;

        Ok(AnthropicProvider {
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
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl VisionProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn display_name(&self) -> &str {
        "Claude"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<ProviderReply, ReceiptError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": request.model,
                "max_tokens": request.max_tokens,
                "messages": [
                    {
                        "role": "user",
                        "content": [
                            {
                                "type": "image",
                                "source": {
                                    "type": "base64",
                                    "media_type": request.mime_type.as_str(),
                                    "data": request.image_data
                                }
                            },
                            {
                                "type": "text",
                                "text": request.instruction
                            }
                        ]
                    }
                ]
            }))
            .send()
            .await?;

        let (status, response_body) =
            read_json_body(response, "Anthropic", self.display_name()).await?;
        debug!("Anthropic response: {:?}", response_body);

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let error_type = error["type"].as_str().unwrap_or("unknown");
            let error_message = error["message"].as_str().unwrap_or("Unknown error");
            return Err(ReceiptError::Provider {
                provider: "Anthropic".to_string(),
                kind: error_type.to_string(),
                message: error_message.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ReceiptError::Provider {
                provider: "Anthropic".to_string(),
                kind: status.to_string(),
                message: response_body.to_string(),
            });
        }

        let block = &response_body["content"][0];
        match block["type"].as_str() {
            Some("text") => block["text"]
                .as_str()
                .map(|text| ProviderReply::Text(text.to_string()))
                .ok_or_else(|| ReceiptError::UnexpectedFormat(self.display_name().to_string())),
            Some(kind) => Ok(ProviderReply::NonText {
                kind: kind.to_string(),
            }),
            None => Err(ReceiptError::UnexpectedFormat(
                self.display_name().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MimeType;
    use mockito::{Matcher, Server};

    fn test_request() -> InferenceRequest {
        InferenceRequest::for_receipt("claude-test", MimeType::Png, "aGVsbG8=")
    }

    #[test]
    fn test_provider_from_config() {
        let config = ProviderConfig {
            enabled: true,
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1500,
            api_key: Some("test-key".to_string()),
            base_url: None,
            api_key_env: None,
        };

        let provider = AnthropicProvider::new(&config, None).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
        assert_eq!(provider.display_name(), "Claude");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_complete_sends_image_and_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "fake_api_key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(json!({
                "model": "claude-test",
                "max_tokens": 1500,
                "messages": [{
                    "role": "user",
                    "content": [
                        {
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": "image/png",
                                "data": "aGVsbG8="
                            }
                        },
                        { "type": "text" }
                    ]
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"text","text":"{\"items\":[],\"recipes\":[]}"}]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("fake_api_key".to_string(), server.url());
        let reply = provider.complete(&test_request()).await.unwrap();

        assert_eq!(
            reply,
            ProviderReply::Text(r#"{"items":[],"recipes":[]}"#.to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_non_text_block() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"tool_use","id":"x","name":"y","input":{}}]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("fake_api_key".to_string(), server.url());
        let reply = provider.complete(&test_request()).await.unwrap();

        assert_eq!(
            reply,
            ProviderReply::NonText {
                kind: "tool_use".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
            )
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("bad_key".to_string(), server.url());
        let err = provider.complete(&test_request()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Anthropic API error (authentication_error): invalid x-api-key"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_empty_content() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("fake_api_key".to_string(), server.url());
        let err = provider.complete(&test_request()).await.unwrap_err();

        assert!(matches!(err, ReceiptError::UnexpectedFormat(_)));
        assert_eq!(err.to_string(), "Unexpected response format from Claude");
    }

    #[tokio::test]
    async fn test_complete_gateway_error_keeps_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(502)
            .with_header("content-type", "text/html")
            .with_body("<html><body>Bad Gateway</body></html>")
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("fake_api_key".to_string(), server.url());
        let err = provider.complete(&test_request()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Anthropic API error (502 Bad Gateway): <html><body>Bad Gateway</body></html>"
        );
    }
}
