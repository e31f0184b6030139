//! Document ingestion: loading, translation and chunking

mod chunker;
mod loader;
mod translator;

pub use chunker::TextChunker;
pub use loader::DocumentLoader;
pub use translator::Translator;
