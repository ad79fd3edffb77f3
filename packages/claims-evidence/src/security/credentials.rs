//! Provider credentials.
//!
//! The key is held as a `secrecy::SecretString`, so it only leaves the
//! struct through [`ModelCredentials::api_key`] when a request is built.

use std::fmt;

use secrecy::ExposeSecret;
pub use secrecy::SecretString;

/// Key, model and endpoint for one provider.
#[derive(Clone)]
pub struct ModelCredentials {
    api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// API base URL, provider default when `None`
    pub base_url: Option<String>,
}

impl ModelCredentials {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// The raw key, for the auth header.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key().trim().is_empty()
    }
}

impl fmt::Debug for ModelCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCredentials")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
