//! Page translation to English through a language model

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{LlmProvider, RetryPolicy};
use crate::types::DocumentPage;

/// Translates page text from a fixed source language to English
pub struct Translator {
    llm: Arc<dyn LlmProvider>,
    source_language: String,
    retry: RetryPolicy,
}

impl Translator {
    /// Create a translator
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        source_language: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            llm,
            source_language: source_language.into(),
            retry,
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Translate one page of text
    ///
    /// Blank input is returned unchanged without calling the model.
    pub async fn translate(&self, page_text: &str) -> Result<String> {
        if page_text.trim().is_empty() {
            return Ok(page_text.to_string());
        }

        let prompt = PromptBuilder::build_translation_prompt(&self.source_language, page_text);

        let translated = self
            .retry
            .run("translation", || self.llm.complete(&prompt))
            .await
            .map_err(|e| match e {
                Error::Translation(_) => e,
                other => Error::translation(other.to_string()),
            })?;

        Ok(translated.trim().to_string())
    }

    /// Translate every page in order; only `text` changes
    pub async fn translate_documents(&self, pages: Vec<DocumentPage>) -> Result<Vec<DocumentPage>> {
        self.translate_documents_with_progress(pages, |_, _| {}).await
    }

    /// Like `translate_documents`, reporting (done, total) after each page
    pub async fn translate_documents_with_progress<F>(
        &self,
        mut pages: Vec<DocumentPage>,
        mut on_page: F,
    ) -> Result<Vec<DocumentPage>>
    where
        F: FnMut(usize, usize),
    {
        let total = pages.len();
        tracing::info!(
            "Translating {} pages from {} via {}. This may take a few minutes...",
            total,
            self.source_language,
            self.llm.model()
        );

        for (i, page) in pages.iter_mut().enumerate() {
            page.text = self.translate(&page.text).await.map_err(|e| match e {
                Error::Translation(msg) => Error::translation(format!(
                    "{} page {}: {}",
                    page.source_path, page.page_number, msg
                )),
                other => other,
            })?;
            tracing::info!("  - Translated page {}/{}", i + 1, total);
            on_page(i + 1, total);
        }

        Ok(pages)
    }
}
