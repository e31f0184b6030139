//! LLM provider trait for text completion

use async_trait::async_trait;
use crate::error::Result;

/// Trait for single-turn language model completion
///
/// Used for both page translation and claim verification; callers own the
/// prompt text.
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API (gemini-2.0-flash)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt and return the model text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
