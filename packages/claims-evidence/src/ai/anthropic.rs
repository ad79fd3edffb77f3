//! Anthropic Messages API provider.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, network_error, status_error, DEFAULT_TIMEOUT};
use crate::error::{ModelError, ModelResult};
use crate::security::ModelCredentials;
use crate::traits::model::LanguageModel;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Claude via the Messages API.
#[derive(Clone)]
pub struct AnthropicModel {
    http_client: Client,
    credentials: ModelCredentials,
    base_url: String,
}

impl AnthropicModel {
    /// Fails when the key is blank or the HTTP client cannot be built.
    pub fn new(credentials: ModelCredentials) -> ModelResult<Self> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(credentials: ModelCredentials, timeout: Duration) -> ModelResult<Self> {
        if !credentials.has_api_key() {
            return Err(ModelError::Config("ANTHROPIC_API_KEY is empty".into()));
        }
        let base_url = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            http_client: http_client(timeout)?,
            credentials,
            base_url,
        })
    }

    pub fn model(&self) -> &str {
        &self.credentials.model
    }
}

#[async_trait]
impl LanguageModel for AnthropicModel {
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String> {
        let start = Instant::now();
        let request = MessagesRequest {
            model: &self.credentials.model,
            max_tokens: max_output_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.credentials.api_key())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, status, error_text));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        debug!(
            model = %self.credentials.model,
            duration_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Anthropic message"
        );

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse(self.credentials.model.clone()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.credentials.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_rejected() {
        let err = AnthropicModel::new(ModelCredentials::new("", DEFAULT_MODEL)).err().unwrap();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_base_url_trimmed() {
        let model = AnthropicModel::new(
            ModelCredentials::new("k", DEFAULT_MODEL).with_base_url("http://localhost:9000/"),
        )
        .unwrap();
        assert_eq!(model.base_url, "http://localhost:9000");
        assert_eq!(model.name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: DEFAULT_MODEL,
            max_tokens: 4000,
            messages: [Message {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_response_text_blocks() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "[1]"}, {"type": "tool_use", "id": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(body.content.len(), 2);
        assert_eq!(body.content[0].text.as_deref(), Some("[1]"));
    }
}
