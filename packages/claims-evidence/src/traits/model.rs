//! Language-model capability used by extraction and synthesis.
//!
//! The pipeline only ever needs "send this prompt, give me text back", so
//! the trait is deliberately narrow. Provider transport details live in
//! [`crate::ai`]; tests use [`crate::testing::MockModel`].

use async_trait::async_trait;

use crate::error::ModelResult;

/// A text-in, text-out language model.
///
/// Implementations wrap specific providers (Anthropic, OpenAI, ...) and
/// return the raw reply text. Parsing the reply is the caller's job.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Submit a single-turn prompt and return the model's reply text.
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String>;

    /// Human-readable identifier for logs (e.g. the model name).
    fn name(&self) -> &str;
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for std::sync::Arc<M> {
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String> {
        (**self).submit(prompt, max_output_tokens).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    async fn submit(&self, prompt: &str, max_output_tokens: u32) -> ModelResult<String> {
        (**self).submit(prompt, max_output_tokens).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
