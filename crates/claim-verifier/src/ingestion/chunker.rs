//! Overlapping fixed-size text chunking with page tracking
//!
//! Sizes are in characters (Unicode scalar values). Every chunk after the first
//! on a page begins exactly `overlap` characters before the previous chunk
//! ended, so dropping those characters and concatenating gives the page back.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, DocumentPage};

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(Error::Config(format!(
                "invalid chunking: size {} with overlap {}",
                chunk_size, overlap
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create from config
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk pages in order
    pub fn chunk(&self, pages: &[DocumentPage]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = pages.iter().flat_map(|p| self.chunk_page(p)).collect();
        tracing::info!("Created {} chunks from {} pages", chunks.len(), pages.len());
        chunks
    }

    /// Chunk a single page; blank pages produce nothing
    pub fn chunk_page(&self, page: &DocumentPage) -> Vec<Chunk> {
        if page.text.trim().is_empty() {
            return Vec::new();
        }

        let offsets = char_offsets(&page.text);
        let source = ChunkSource::from_page(page);

        self.split_ranges(&page.text, &offsets)
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| {
                Chunk::new(
                    page.text[offsets[start]..offsets[end]].to_string(),
                    source.clone(),
                    start,
                    end,
                    index as u32,
                )
            })
            .collect()
    }

    /// Character ranges covering `text`
    fn split_ranges(&self, text: &str, offsets: &[usize]) -> Vec<(usize, usize)> {
        let total = offsets.len() - 1;
        let sentence_breaks = self.sentence_breaks(text, offsets);
        let word_breaks = word_breaks(text);

        let mut ranges = Vec::new();
        let mut start = 0usize;

        loop {
            let hard_end = (start + self.chunk_size).min(total);
            if hard_end == total {
                ranges.push((start, total));
                break;
            }

            // Chunks must stay longer than the overlap so the cursor advances,
            // and a soft break is only taken in the back half of the window.
            let min_end = start + self.overlap + 1;
            let soft_min = (start + self.chunk_size / 2).max(min_end);

            let end = last_break_in(&sentence_breaks, soft_min, hard_end)
                .or_else(|| last_break_in(&word_breaks, soft_min, hard_end))
                .unwrap_or(hard_end);

            ranges.push((start, end));
            start = end - self.overlap;
        }

        ranges
    }

    /// Sentence starts as character positions
    fn sentence_breaks(&self, text: &str, offsets: &[usize]) -> Vec<usize> {
        text.split_sentence_bound_indices()
            .filter_map(|(byte, _)| offsets.binary_search(&byte).ok())
            .filter(|&pos| pos > 0)
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

/// Byte offset of every character plus the end of the text
fn char_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Positions just after a whitespace character
fn word_breaks(text: &str) -> Vec<usize> {
    text.chars()
        .enumerate()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i + 1)
        .collect()
}

/// Largest break in `[lo, hi]`
fn last_break_in(breaks: &[usize], lo: usize, hi: usize) -> Option<usize> {
    let idx = breaks.partition_point(|&b| b <= hi);
    match idx {
        0 => None,
        _ if breaks[idx - 1] >= lo => Some(breaks[idx - 1]),
        _ => None,
    }
}
