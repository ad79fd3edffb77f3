use anyhow::{bail, Context, Result};
use claims_evidence::{ExposeSecret, ModelCredentials, SecretString};
use dotenvy::dotenv;
use std::env;

use crate::cli::Provider;

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Provider settings loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub anthropic_api_key: Option<SecretString>,
    pub anthropic_model: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub requests_per_minute: Option<u32>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            anthropic_api_key: var("ANTHROPIC_API_KEY").map(SecretString::from),
            anthropic_model: var("ANTHROPIC_MODEL"),
            anthropic_base_url: var("ANTHROPIC_BASE_URL"),
            openai_api_key: var("OPENAI_API_KEY").map(SecretString::from),
            openai_model: var("OPENAI_MODEL"),
            openai_base_url: var("OPENAI_BASE_URL"),
            requests_per_minute: var("CLAIMS_REQUESTS_PER_MINUTE")
                .map(|v| v.trim().parse::<u32>())
                .transpose()
                .context("CLAIMS_REQUESTS_PER_MINUTE must be a valid number")?,
        })
    }

    /// Credentials for `provider`. A missing key is fatal.
    pub fn credentials_for(
        &self,
        provider: Provider,
        model: Option<&str>,
    ) -> Result<ModelCredentials> {
        let (key, env_model, base_url, default_model, key_var) = match provider {
            Provider::Anthropic => (
                &self.anthropic_api_key,
                &self.anthropic_model,
                &self.anthropic_base_url,
                DEFAULT_ANTHROPIC_MODEL,
                "ANTHROPIC_API_KEY",
            ),
            Provider::Openai => (
                &self.openai_api_key,
                &self.openai_model,
                &self.openai_base_url,
                DEFAULT_OPENAI_MODEL,
                "OPENAI_API_KEY",
            ),
        };

        let Some(key) = key else {
            bail!("{key_var} must be set");
        };

        let model = model
            .map(str::to_string)
            .or_else(|| env_model.clone())
            .unwrap_or_else(|| default_model.to_string());

        let mut credentials = ModelCredentials::new(key.expose_secret(), model);
        if let Some(url) = base_url {
            credentials = credentials.with_base_url(url.clone());
        }
        Ok(credentials)
    }
}
