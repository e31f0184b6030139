//! Page and chunk types with source tracking

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source document formats the loader understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document, read page by page
    Pdf,
    /// Plain text file; form feeds separate pages
    Txt,
    /// Markdown file; treated like plain text
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// One page of a source document
///
/// Created by the loader; the translator replaces `text` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Path the page was loaded from
    pub source_path: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Page text
    pub text: String,
}

impl DocumentPage {
    /// Create a page
    pub fn new(source_path: impl Into<String>, page_number: u32, text: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            page_number,
            text: text.into(),
        }
    }
}

/// Source information for a chunk, copied from its page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Path of the source document
    pub source_path: String,
    /// Page number (1-indexed)
    pub page_number: u32,
}

impl ChunkSource {
    /// Source info for a page
    pub fn from_page(page: &DocumentPage) -> Self {
        Self {
            source_path: page.source_path.clone(),
            page_number: page.page_number,
        }
    }

    /// Format source for display
    pub fn format_citation(&self) -> String {
        let filename = Path::new(&self.source_path)
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source_path.clone());
        format!("{}, Page {}", filename, self.page_number)
    }
}

/// A bounded slice of page text; the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content
    pub content: String,
    /// Source information
    pub source: ChunkSource,
    /// Character range within the page text
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within the page
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        content: String,
        source: ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            content,
            source,
            char_start,
            char_end,
            chunk_index,
        }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

/// A chunk returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is closer)
    pub score: f32,
}
