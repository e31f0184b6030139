//! Vector index over chunk embeddings and its on-disk format

pub mod persist;
mod store;

pub use store::{IndexMeta, VectorIndex, FORMAT_VERSION};
