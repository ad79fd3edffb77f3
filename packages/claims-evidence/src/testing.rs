//! Testing utilities.
//!
//! [`MockModel`] stands in for a provider so extraction and synthesis can be
//! exercised without network calls.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{ModelError, ModelResult};
use crate::traits::model::LanguageModel;

/// Reply returned when nothing else is scripted.
pub const DEFAULT_REPLY: &str = "[]";

/// Record of a call made to the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub prompt: String,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(ModelError),
}

/// A deterministic, scriptable language model.
///
/// Reply resolution, first match wins:
/// 1. the next queued reply (see [`MockModel::with_responses`])
/// 2. the first rule whose substring occurs in the prompt, in the order
///    rules were added
/// 3. a blanket failure set with [`MockModel::with_failure`]
/// 4. the default reply (`[]` unless overridden)
#[derive(Default, Clone)]
pub struct MockModel {
    queue: Arc<RwLock<VecDeque<MockReply>>>,
    rules: Arc<RwLock<Vec<(String, MockReply)>>>,
    failure: Arc<RwLock<Option<ModelError>>>,
    default_reply: Arc<RwLock<Option<String>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used when nothing else matches.
    pub fn with_default_response(self, reply: impl Into<String>) -> Self {
        *write(&self.default_reply) = Some(reply.into());
        self
    }

    /// Reply with `reply` whenever the prompt contains `substring`.
    pub fn with_response_for(self, substring: impl Into<String>, reply: impl Into<String>) -> Self {
        write(&self.rules).push((substring.into(), MockReply::Text(reply.into())));
        self
    }

    /// Fail whenever the prompt contains `substring`.
    pub fn with_failure_for(self, substring: impl Into<String>, error: ModelError) -> Self {
        write(&self.rules).push((substring.into(), MockReply::Fail(error)));
        self
    }

    /// Queue replies served one per call, in order, before any rule.
    pub fn with_responses<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        write(&self.queue).extend(replies.into_iter().map(|r| MockReply::Text(r.into())));
        self
    }

    /// Queue a single failing call.
    pub fn then_fail(self, error: ModelError) -> Self {
        write(&self.queue).push_back(MockReply::Fail(error));
        self
    }

    /// Fail every call that no queued reply or rule answers.
    pub fn with_failure(self, error: ModelError) -> Self {
        *write(&self.failure) = Some(error);
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockCall> {
        read(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        read(&self.calls).len()
    }

    fn reply_for(&self, prompt: &str) -> MockReply {
        if let Some(reply) = write(&self.queue).pop_front() {
            return reply;
        }
        let rules = read(&self.rules);
        if let Some((_, reply)) = rules.iter().find(|(s, _)| prompt.contains(s.as_str())) {
            return reply.clone();
        }
        if let Some(error) = read(&self.failure).clone() {
            return MockReply::Fail(error);
        }
        MockReply::Text(
            read(&self.default_reply)
                .clone()
                .unwrap_or_else(|| DEFAULT_REPLY.to_string()),
        )
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String> {
        write(&self.calls).push(MockCall {
            prompt: prompt.to_string(),
            max_output_tokens,
        });

        match self.reply_for(prompt) {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolution_order() {
        let model = MockModel::new()
            .with_responses(["first"])
            .with_response_for("alpha", "A")
            .with_failure_for("beta", ModelError::Network("down".into()))
            .with_default_response("fallback");

        assert_eq!(model.submit("alpha", 1).await.unwrap(), "first");
        assert_eq!(model.submit("alpha", 1).await.unwrap(), "A");
        assert!(model.submit("beta", 1).await.is_err());
        assert_eq!(model.submit("gamma", 1).await.unwrap(), "fallback");
        assert_eq!(model.call_count(), 4);
    }

    #[tokio::test]
    async fn test_default_reply() {
        let model = MockModel::new();
        assert_eq!(model.submit("x", 7).await.unwrap(), DEFAULT_REPLY);
        assert_eq!(
            model.calls(),
            vec![MockCall {
                prompt: "x".into(),
                max_output_tokens: 7
            }]
        );
    }

    #[tokio::test]
    async fn test_queued_failure() {
        let model = MockModel::new().then_fail(ModelError::RateLimited("429".into()));
        assert!(matches!(
            model.submit("x", 1).await,
            Err(ModelError::RateLimited(_))
        ));
        assert!(model.submit("x", 1).await.is_ok());
    }
}
