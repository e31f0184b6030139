//! Request and response bodies for the HTTP surface

use serde::{Deserialize, Serialize};

use super::document::SearchHit;
use super::verdict::{Verdict, VerdictLabel};

/// Body of `POST /validate_claim`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Claim text to verify
    pub input: String,
}

/// A retrieved passage the verdict was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source document path
    pub source_path: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Cosine similarity to the claim
    pub score: f32,
}

impl From<&SearchHit> for SourceRef {
    fn from(hit: &SearchHit) -> Self {
        Self {
            source_path: hit.chunk.source.source_path.clone(),
            page_number: hit.chunk.source.page_number,
            score: hit.score,
        }
    }
}

/// Response of `POST /validate_claim`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    /// The claim as submitted
    pub claim: String,
    /// Raw model output
    pub verification: String,
    /// Label parsed from the model output, if it led with one
    pub label: Option<VerdictLabel>,
    /// Passages the model was given
    pub sources: Vec<SourceRef>,
}

impl ClaimResponse {
    /// Build a response from a verdict and the hits it was grounded on
    pub fn new(claim: String, verdict: Verdict, hits: &[SearchHit]) -> Self {
        Self {
            claim,
            verification: verdict.raw,
            label: verdict.label,
            sources: hits.iter().map(SourceRef::from).collect(),
        }
    }
}
