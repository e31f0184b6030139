//! Core types for the claim verifier

pub mod document;
pub mod response;
pub mod verdict;

pub use document::{Chunk, ChunkSource, DocumentPage, FileType, SearchHit};
pub use response::{ClaimRequest, ClaimResponse, SourceRef};
pub use verdict::{Verdict, VerdictLabel};
