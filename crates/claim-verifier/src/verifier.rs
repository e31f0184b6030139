//! Claim verification over the persisted index

use std::sync::Arc;
use std::time::Instant;

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::index::{persist, VectorIndex};
use crate::pipeline::IndexBuilder;
use crate::providers::{EmbeddingProvider, LlmProvider, RetryPolicy};
use crate::types::{SearchHit, Verdict};

/// Query-time knobs
#[derive(Debug, Clone, Copy)]
pub struct VerifierSettings {
    /// Chunks retrieved per claim
    pub top_k: usize,
    pub retry: RetryPolicy,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            top_k: 7,
            retry: RetryPolicy::default(),
        }
    }
}

impl VerifierSettings {
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self {
            top_k: config.index.top_k,
            retry: config.retry.policy(),
        }
    }
}

/// A verdict together with the passages it was grounded on
#[derive(Debug, Clone)]
pub struct Verification {
    pub verdict: Verdict,
    pub hits: Vec<SearchHit>,
}

/// Verifies claims against the indexed policy documents
///
/// Holds no per-request state, so one instance is shared across all
/// handlers behind an `Arc`.
pub struct ClaimVerifier {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    settings: VerifierSettings,
}

impl ClaimVerifier {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        settings: VerifierSettings,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            settings,
        }
    }

    /// Load the persisted index, or build and persist it from the configured documents
    ///
    /// Any failure here is fatal for the caller; there is no degraded mode.
    pub async fn initialize(
        config: &VerifierConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        translator_llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        let index_dir = &config.index.path;

        let index = if persist::exists(index_dir) {
            tracing::info!("Loading existing vector index from: {}", index_dir.display());
            let index = persist::load(index_dir)?;
            index.check_compatible(embedder.as_ref())?;
            index
        } else if config.ingestion.documents.is_empty() {
            return Err(Error::Config(format!(
                "no index at {} and no source documents configured",
                index_dir.display()
            )));
        } else {
            tracing::info!(
                "No index at {}; building from {} documents",
                index_dir.display(),
                config.ingestion.documents.len()
            );
            IndexBuilder::from_config(config, embedder.clone(), translator_llm)?
                .build_and_save(&config.ingestion.documents, index_dir)
                .await?
        };

        if index.is_empty() {
            return Err(Error::corrupt_index("index has no entries"));
        }

        Ok(Self::new(
            Arc::new(index),
            embedder,
            llm,
            VerifierSettings::from_config(config),
        ))
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Embed the claim and return the `top_k` closest chunks
    pub async fn retrieve(&self, claim: &str) -> Result<Vec<SearchHit>> {
        let query = self
            .settings
            .retry
            .run("claim embedding", || self.embedder.embed(claim))
            .await?;
        self.index.search(&query, self.settings.top_k)
    }

    /// Retrieve, prompt and ask the model for a verdict
    pub async fn verify(&self, claim: &str) -> Result<Verification> {
        let claim = claim.trim();
        if claim.is_empty() {
            return Err(Error::validation("claim must not be empty"));
        }

        let started = Instant::now();
        let hits = self.retrieve(claim).await?;
        let context = PromptBuilder::build_context(&hits);
        let prompt = PromptBuilder::build_verification_prompt(claim, &context);

        let raw = self
            .settings
            .retry
            .run("verdict generation", || self.llm.complete(&prompt))
            .await?;
        let verdict = Verdict::parse(raw);

        tracing::info!(
            label = verdict.label.map(|l| l.as_str()).unwrap_or("none"),
            hits = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Verified claim"
        );

        Ok(Verification { verdict, hits })
    }

    /// Verdict for a claim
    pub async fn process_claim(&self, claim: &str) -> Result<Verdict> {
        Ok(self.verify(claim).await?.verdict)
    }
}
