//! claim-verifier: retrieval-augmented fact-checking of political claims
//!
//! Party policy documents are translated to English, chunked, embedded and
//! stored in a persisted vector index. Claims are checked by retrieving the
//! closest chunks and asking a language model for a TRUE / FALSE /
//! UNVERIFIABLE verdict grounded only in those chunks.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;
pub mod verifier;

pub use config::VerifierConfig;
pub use error::{Error, Result};
pub use index::{IndexMeta, VectorIndex};
pub use pipeline::IndexBuilder;
pub use types::{
    document::{Chunk, ChunkSource, DocumentPage, FileType, SearchHit},
    response::{ClaimRequest, ClaimResponse},
    verdict::{Verdict, VerdictLabel},
};
pub use verifier::{ClaimVerifier, Verification, VerifierSettings};
