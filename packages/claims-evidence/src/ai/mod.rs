//! Language-model providers.
//!
//! Each provider is a thin `reqwest` client implementing
//! [`LanguageModel`](crate::traits::model::LanguageModel). One attempt per
//! call; failures map onto [`ModelError`] and are never retried.

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "openai")]
pub mod openai;
pub mod rate_limited;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicModel;
#[cfg(feature = "openai")]
pub use openai::OpenAiModel;
pub use rate_limited::RateLimitedModel;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::error::{ModelError, ModelResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn http_client(timeout: Duration) -> ModelResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ModelError::Config(format!("cannot build HTTP client: {e}")))
}

/// Map a non-2xx response onto a [`ModelError`].
pub(crate) fn status_error(provider: &str, status: StatusCode, body: String) -> ModelError {
    warn!(provider, status = %status, error = %body, "model API error");
    if status == StatusCode::TOO_MANY_REQUESTS {
        ModelError::RateLimited(body)
    } else {
        ModelError::Api {
            status: status.as_u16(),
            message: body,
        }
    }
}

pub(crate) fn network_error(provider: &str, e: reqwest::Error) -> ModelError {
    warn!(provider, error = %e, "model request failed");
    ModelError::Network(e.to_string())
}
