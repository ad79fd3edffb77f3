//! Rate-limited model wrapper.
//!
//! Wraps any [`LanguageModel`] with a `governor` quota so concurrent
//! extraction stays under the provider's request budget.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};

use crate::error::{ModelError, ModelResult};
use crate::traits::model::LanguageModel;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A model wrapper that waits for a permit before every call.
pub struct RateLimitedModel<M: LanguageModel> {
    inner: M,
    limiter: Arc<DefaultRateLimiter>,
}

impl<M: LanguageModel> RateLimitedModel<M> {
    /// Allow `requests_per_minute` calls per minute, no bursting beyond that.
    pub fn per_minute(model: M, requests_per_minute: u32) -> ModelResult<Self> {
        let rate = NonZeroU32::new(requests_per_minute)
            .ok_or_else(|| ModelError::Config("requests per minute must be > 0".into()))?;
        Ok(Self::with_quota(model, Quota::per_minute(rate)))
    }

    /// Create with a custom quota.
    pub fn with_quota(model: M, quota: Quota) -> Self {
        Self {
            inner: model,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: LanguageModel> LanguageModel for RateLimitedModel<M> {
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String> {
        self.limiter.until_ready().await;
        self.inner.submit(prompt, max_output_tokens).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
