//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// The same provider configuration must embed both the corpus and incoming
/// claims, otherwise similarity scores are meaningless. `model()` and
/// `dimensions()` are recorded in the persisted index and checked on load.
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API (gemini-embedding-001)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Default implementation calls `embed` sequentially.
    /// Implementations should override for better performance.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get the embedding model identifier
    fn model(&self) -> &str;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
