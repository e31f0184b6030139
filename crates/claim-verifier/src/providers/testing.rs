//! Deterministic provider stubs for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};

pub const STUB_DIMENSIONS: usize = 32;

/// Hashed bag-of-words embedder: texts sharing words land close together
pub struct StubEmbedder {
    model: String,
    dimensions: usize,
    calls: AtomicUsize,
    failures: usize,
    short_batches: bool,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::with_model("stub-embedding-v1", STUB_DIMENSIONS)
    }

    pub fn with_model(model: &str, dimensions: usize) -> Self {
        Self {
            model: model.to_string(),
            dimensions,
            calls: AtomicUsize::new(0),
            failures: 0,
            short_batches: false,
        }
    }

    /// The first `failures` calls to `embed` fail with an embedding error
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::new()
        }
    }

    /// `embed_batch` drops the last vector of every batch
    pub fn short_batches() -> Self {
        Self {
            short_batches: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.to_lowercase().bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        if vector.iter().all(|v| *v == 0.0) {
            vector[0] = 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(Error::embedding("503 Service Unavailable"));
        }
        Ok(self.vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        if self.short_batches {
            embeddings.pop();
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "stub"
    }
}

type Responder = dyn Fn(&str, usize) -> Result<String> + Send + Sync;

/// LLM stub driven by a closure of (prompt, call number)
pub struct StubLlm {
    responder: Arc<Responder>,
    calls: AtomicUsize,
}

impl StubLlm {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, usize) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answers with the same text
    pub fn fixed(answer: &str) -> Self {
        let answer = answer.to_string();
        Self::new(move |_, _| Ok(answer.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(prompt, call)
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-llm"
    }
}
