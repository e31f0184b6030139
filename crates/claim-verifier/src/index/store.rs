//! Exact in-memory cosine similarity index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, SearchHit};

/// On-disk format version written by this build
pub const FORMAT_VERSION: u32 = 1;

/// Provenance stored alongside the vectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub format_version: u32,
    /// Embedding model every vector was produced with
    pub embedding_model: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
}

impl IndexMeta {
    pub fn new(embedding_model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            embedding_model: embedding_model.into(),
            dimensions,
            created_at: Utc::now(),
        }
    }
}

/// A stored vector with the chunk it embeds
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexEntry {
    pub vector: Vec<f32>,
    /// Precomputed L2 norm of `vector`
    pub norm: f32,
    pub chunk: Chunk,
}

/// Immutable vector index over chunk embeddings
///
/// Built once, then only read. Search is a brute-force scan, which keeps
/// results exact and reproducible across save and load.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    meta: IndexMeta,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from (vector, chunk) pairs
    ///
    /// Every vector must have `meta.dimensions` components.
    pub fn build(entries: Vec<(Vec<f32>, Chunk)>, meta: IndexMeta) -> Result<Self> {
        if meta.dimensions == 0 {
            return Err(Error::Config("index dimensions must be non-zero".to_string()));
        }

        let entries = entries
            .into_iter()
            .map(|(vector, chunk)| {
                if vector.len() != meta.dimensions {
                    return Err(Error::DimensionMismatch {
                        expected: meta.dimensions,
                        actual: vector.len(),
                    });
                }
                let norm = l2_norm(&vector);
                Ok(IndexEntry { vector, norm, chunk })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Built index with {} vectors ({} dims, model {})",
            entries.len(),
            meta.dimensions,
            meta.embedding_model
        );

        Ok(Self { meta, entries })
    }

    pub(crate) fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by cosine similarity to `query`, best first
    ///
    /// Equal scores keep insertion order. `k` larger than the index returns
    /// every entry.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.meta.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.meta.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine(query, query_norm, &entry.vector, entry.norm)))
            .collect();

        // Stable sort: ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity; zero vectors score 0
fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkSource;

    fn chunk(text: &str, page: u32) -> Chunk {
        let source = ChunkSource {
            source_path: "policies/h.pdf".to_string(),
            page_number: page,
        };
        Chunk::new(text.to_string(), source, 0, text.chars().count(), 0)
    }

    fn sample() -> VectorIndex {
        VectorIndex::build(
            vec![
                (vec![1.0, 0.0, 0.0], chunk("tax", 1)),
                (vec![0.0, 1.0, 0.0], chunk("health", 2)),
                (vec![0.7, 0.7, 0.0], chunk("tax and health", 3)),
                (vec![0.0, 0.0, 1.0], chunk("roads", 4)),
            ],
            IndexMeta::new("test-model", 3),
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let hits = sample().search(&[1.0, 0.1, 0.0], 3).unwrap();
        let texts: Vec<_> = hits.iter().map(|h| h.chunk.content.as_str()).collect();

        assert_eq!(texts, vec!["tax", "tax and health", "health"]);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert!((hits[0].score - 0.995).abs() < 0.01);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = VectorIndex::build(
            vec![
                (vec![1.0, 0.0], chunk("first", 1)),
                (vec![2.0, 0.0], chunk("second", 2)),
                (vec![0.0, 1.0], chunk("third", 3)),
                (vec![3.0, 0.0], chunk("fourth", 4)),
            ],
            IndexMeta::new("test-model", 2),
        )
        .unwrap();

        let hits = index.search(&[5.0, 0.0], 3).unwrap();
        let pages: Vec<_> = hits.iter().map(|h| h.chunk.source.page_number).collect();
        assert_eq!(pages, vec![1, 2, 4]);
    }

    #[test]
    fn test_k_zero_and_k_beyond_len() {
        let index = sample();
        assert!(index.search(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
        assert_eq!(index.search(&[1.0, 0.0, 0.0], 50).unwrap().len(), index.len());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let result = sample().search(&[1.0, 0.0], 2);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_build_rejects_wrong_dimension() {
        let result = VectorIndex::build(
            vec![(vec![1.0, 0.0], chunk("short", 1))],
            IndexMeta::new("test-model", 3),
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let index = VectorIndex::build(
            vec![(vec![0.0, 0.0], chunk("empty", 1))],
            IndexMeta::new("test-model", 2),
        )
        .unwrap();
        let hits = index.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].score, 0.0);
    }
}
