//! OpenAI chat-completions provider.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, network_error, status_error, DEFAULT_TIMEOUT};
use crate::error::{ModelError, ModelResult};
use crate::security::ModelCredentials;
use crate::traits::model::LanguageModel;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// GPT models via chat completions.
#[derive(Clone)]
pub struct OpenAiModel {
    http_client: Client,
    credentials: ModelCredentials,
    base_url: String,
}

impl OpenAiModel {
    pub fn new(credentials: ModelCredentials) -> ModelResult<Self> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(credentials: ModelCredentials, timeout: Duration) -> ModelResult<Self> {
        if !credentials.has_api_key() {
            return Err(ModelError::Config("OPENAI_API_KEY is empty".into()));
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
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.credentials.model,
            max_tokens: max_output_tokens,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.api_key()),
            )
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

        let chat_response: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ModelError::EmptyResponse(self.credentials.model.clone()))?;

        debug!(
            model = %self.credentials.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "OpenAI chat completion"
        );

        Ok(content)
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
        assert!(OpenAiModel::new(ModelCredentials::new(" ", DEFAULT_MODEL)).is_err());
    }

    #[test]
    fn test_response_without_content() {
        let raw: ChatResponseRaw =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(raw.choices[0].message.content.is_none());
    }
}
