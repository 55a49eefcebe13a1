//! The provider seam: one hosted model API behind a single async call

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A hosted vision model
///
/// Implementations translate [`CompletionRequest`] into the vendor's wire
/// format (Anthropic messages, OpenAI-compatible chat completions, Gemini
/// `generateContent`) and map HTTP failures onto [`crate::LLMError`] so the
/// retry policy can tell transient errors from permanent ones.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short name used in logs and errors, e.g. `"anthropic"`, `"perplexity"`
    fn name(&self) -> &str;
}
