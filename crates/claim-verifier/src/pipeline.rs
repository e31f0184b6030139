//! Offline index build: load, translate, chunk, embed

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::index::{persist, IndexMeta, VectorIndex};
use crate::ingestion::{DocumentLoader, TextChunker, Translator};
use crate::providers::{EmbeddingProvider, LlmProvider, RetryPolicy};

/// Texts per embedding request
const EMBED_BATCH_SIZE: usize = 100;

/// Build phases reported to a progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Translating,
    Embedding,
}

/// Progress callback: (stage, done, total)
pub type ProgressFn = Arc<dyn Fn(BuildStage, usize, usize) + Send + Sync>;

/// Turns source documents into a searchable `VectorIndex`
pub struct IndexBuilder {
    loader: DocumentLoader,
    translator: Translator,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    retry: RetryPolicy,
    progress: Option<ProgressFn>,
}

impl IndexBuilder {
    pub fn new(
        loader: DocumentLoader,
        translator: Translator,
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            loader,
            translator,
            chunker,
            embedder,
            retry,
            progress: None,
        }
    }

    /// Wire up every stage from configuration
    pub fn from_config(
        config: &VerifierConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        translator_llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        let retry = config.retry.policy();
        Ok(Self::new(
            DocumentLoader::new(config.ingestion.on_load_error),
            Translator::new(translator_llm, config.ingestion.source_language.clone(), retry),
            TextChunker::from_config(&config.chunking)?,
            embedder,
            retry,
        ))
    }

    /// Report progress to `callback` during translation and embedding
    pub fn with_progress(mut self, callback: ProgressFn) -> Self {
        self.progress = Some(callback);
        self
    }

    fn report(&self, stage: BuildStage, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(stage, done, total);
        }
    }

    /// Build an index from the given source documents
    ///
    /// Fails rather than return an index with no entries.
    pub async fn build(&self, paths: &[PathBuf]) -> Result<VectorIndex> {
        let started = Instant::now();
        if paths.is_empty() {
            return Err(Error::Config("no source documents configured".to_string()));
        }

        let loader = self.loader.clone();
        let owned_paths = paths.to_vec();
        let pages = tokio::task::spawn_blocking(move || loader.load(&owned_paths))
            .await
            .map_err(|e| Error::internal(format!("document loading task failed: {}", e)))??;
        tracing::info!("Loaded {} pages from {} documents", pages.len(), paths.len());

        let pages = self
            .translator
            .translate_documents_with_progress(pages, |done, total| {
                self.report(BuildStage::Translating, done, total)
            })
            .await?;

        let chunks = self.chunker.chunk(&pages);
        if chunks.is_empty() {
            return Err(Error::load(&paths[0], "no text extracted from source documents"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embed_chunks(&texts).await?;

        let meta = IndexMeta::new(self.embedder.model(), self.embedder.dimensions());
        let index = VectorIndex::build(vectors.into_iter().zip(chunks).collect(), meta)?;

        tracing::info!(
            "Index built: {} chunks embedded with {} in {:.1}s",
            index.len(),
            self.embedder.model(),
            started.elapsed().as_secs_f64()
        );
        Ok(index)
    }

    /// Build, then persist under `index_dir`
    pub async fn build_and_save(&self, paths: &[PathBuf], index_dir: &Path) -> Result<VectorIndex> {
        let index = self.build(paths).await?;
        persist::save(&index, index_dir)?;
        Ok(index)
    }

    async fn embed_chunks(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let total = texts.len();
        let mut vectors = Vec::with_capacity(total);

        tracing::info!("Embedding {} chunks with {}", total, self.embedder.name());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let embedded = self
                .retry
                .run("embedding batch", || self.embedder.embed_batch(batch))
                .await?;
            if embedded.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
            tracing::debug!("Embedded {}/{} chunks", vectors.len(), total);
            self.report(BuildStage::Embedding, vectors.len(), total);
        }

        Ok(vectors)
    }
}
