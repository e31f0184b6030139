//! Provider abstractions for embeddings and language models
//!
//! The pipeline only sees the traits, so tests swap in stubs and the server
//! wires in Gemini.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::LlmProvider;
pub use retry::RetryPolicy;
