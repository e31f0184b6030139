//! Checksummed on-disk index format
//!
//! `<dir>/index.bin` holds a fixed header followed by a bincode payload:
//!
//! ```text
//! "CVIX" | format version (u32 LE) | SHA-256 of payload (32 bytes) | payload
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::store::{IndexMeta, VectorIndex, FORMAT_VERSION};
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

const MAGIC: &[u8; 4] = b"CVIX";
const HEADER_LEN: usize = 4 + 4 + 32;

/// File name inside the index directory
pub const INDEX_FILE: &str = "index.bin";

#[derive(Serialize)]
struct PayloadRef<'a> {
    meta: &'a IndexMeta,
    entries: Vec<(&'a [f32], &'a Chunk)>,
}

#[derive(Deserialize)]
struct Payload {
    meta: IndexMeta,
    entries: Vec<(Vec<f32>, Chunk)>,
}

/// Path of the index file for an index directory
pub fn index_file(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Whether an index has been saved under `dir`
pub fn exists(dir: &Path) -> bool {
    index_file(dir).is_file()
}

/// Write the index to `dir`, replacing any previous one atomically
pub fn save(index: &VectorIndex, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let payload = PayloadRef {
        meta: index.meta(),
        entries: index
            .entries()
            .iter()
            .map(|e| (e.vector.as_slice(), &e.chunk))
            .collect(),
    };
    let payload = bincode::serde::encode_to_vec(&payload, bincode::config::standard())
        .map_err(|e| Error::internal(format!("failed to encode index: {}", e)))?;
    let checksum = Sha256::digest(&payload);

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(MAGIC)?;
    file.write_all(&FORMAT_VERSION.to_le_bytes())?;
    file.write_all(&checksum)?;
    file.write_all(&payload)?;
    file.as_file().sync_all()?;

    let target = index_file(dir);
    file.persist(&target).map_err(|e| Error::Io(e.error))?;

    tracing::info!(
        "Saved index with {} vectors to {} (sha256 {})",
        index.len(),
        target.display(),
        &hex::encode(checksum)[..12]
    );
    Ok(())
}

/// Read and verify the index saved under `dir`
pub fn load(dir: &Path) -> Result<VectorIndex> {
    let path = index_file(dir);
    let bytes = std::fs::read(&path)?;

    if bytes.len() < HEADER_LEN {
        return Err(Error::corrupt_index(format!(
            "{} is {} bytes, shorter than the header",
            path.display(),
            bytes.len()
        )));
    }

    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[..4] != MAGIC {
        return Err(Error::corrupt_index(format!("{} is not an index file", path.display())));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&header[4..8]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(Error::corrupt_index(format!(
            "unsupported format version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    if Sha256::digest(payload).as_slice() != &header[8..HEADER_LEN] {
        return Err(Error::corrupt_index(format!("checksum mismatch in {}", path.display())));
    }

    let (decoded, _): (Payload, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| Error::corrupt_index(format!("undecodable payload: {}", e)))?;

    if decoded.meta.format_version != version {
        return Err(Error::corrupt_index(format!(
            "header version {} disagrees with metadata version {}",
            version, decoded.meta.format_version
        )));
    }

    let index = VectorIndex::build(decoded.entries, decoded.meta)
        .map_err(|e| Error::corrupt_index(e.to_string()))?;

    tracing::info!(
        "Loaded index with {} vectors from {} (model {}, {} dims)",
        index.len(),
        path.display(),
        index.meta().embedding_model,
        index.meta().dimensions
    );
    Ok(index)
}

impl VectorIndex {
    /// Fail unless `embedder` matches the model and dimensions the index was built with
    pub fn check_compatible(&self, embedder: &dyn EmbeddingProvider) -> Result<()> {
        let meta = self.meta();
        if meta.embedding_model != embedder.model() || meta.dimensions != embedder.dimensions() {
            return Err(Error::IndexMismatch {
                expected: format!("{} ({} dims)", embedder.model(), embedder.dimensions()),
                found: format!("{} ({} dims)", meta.embedding_model, meta.dimensions),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{StubEmbedder, STUB_DIMENSIONS};
    use crate::types::ChunkSource;
    use tempfile::TempDir;

    fn sample_index() -> VectorIndex {
        let embedder = StubEmbedder::new();
        let texts = [
            "The party opposes any new carbon tax.",
            "Kindergarten places will be free for all families.",
            "Road tolls will be removed on national roads.",
            "Hospitals get a larger share of the state budget.",
        ];
        let entries = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let source = ChunkSource {
                    source_path: "policies/frp.pdf".to_string(),
                    page_number: i as u32 + 1,
                };
                let chunk = Chunk::new(text.to_string(), source, 0, text.chars().count(), 0);
                (embedder.vector_for(text), chunk)
            })
            .collect();
        VectorIndex::build(entries, IndexMeta::new(embedder.model(), STUB_DIMENSIONS)).unwrap()
    }

    fn saved() -> (TempDir, VectorIndex) {
        let dir = TempDir::new().unwrap();
        let index = sample_index();
        save(&index, dir.path()).unwrap();
        (dir, index)
    }

    #[test]
    fn test_round_trip_searches_identically() {
        let (dir, index) = saved();
        let loaded = load(dir.path()).unwrap();

        assert_eq!(loaded.meta(), index.meta());
        assert_eq!(loaded.len(), index.len());

        let embedder = StubEmbedder::new();
        for query in ["carbon tax", "free kindergarten", "roads and tolls", "nothing matches"] {
            let q = embedder.vector_for(query);
            assert_eq!(index.search(&q, 3).unwrap(), loaded.search(&q, 3).unwrap());
        }
    }

    #[test]
    fn test_save_replaces_previous_index() {
        let (dir, _) = saved();
        let meta = IndexMeta::new("stub-embedding-v1", STUB_DIMENSIONS);
        let smaller = VectorIndex::build(Vec::new(), meta).unwrap();
        save(&smaller, dir.path()).unwrap();

        assert!(load(dir.path()).unwrap().is_empty());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let (dir, _) = saved();
        let path = index_file(dir.path());
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[0] = b'X';
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(load(dir.path()), Err(Error::CorruptIndex(_))));
    }

    #[test]
    fn test_flipped_payload_byte_is_corrupt() {
        let (dir, _) = saved();
        let path = index_file(dir.path());
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        match load(dir.path()) {
            Err(Error::CorruptIndex(msg)) => assert!(msg.contains("checksum"), "{}", msg),
            other => panic!("expected corrupt index, got {:?}", other.map(|i| i.len())),
        }
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let (dir, _) = saved();
        let path = index_file(dir.path());
        let bytes = std::fs::read(&path).unwrap();

        std::fs::write(&path, &bytes[..HEADER_LEN - 1]).unwrap();
        assert!(matches!(load(dir.path()), Err(Error::CorruptIndex(_))));

        std::fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();
        assert!(matches!(load(dir.path()), Err(Error::CorruptIndex(_))));
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let (dir, _) = saved();
        let path = index_file(dir.path());
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(load(dir.path()), Err(Error::CorruptIndex(_))));
    }

    #[test]
    fn test_missing_index_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(!exists(dir.path()));
        assert!(matches!(load(dir.path()), Err(Error::Io(_))));
    }

    #[test]
    fn test_embedder_mismatch() {
        let index = sample_index();
        assert!(index.check_compatible(&StubEmbedder::new()).is_ok());

        let other_model = StubEmbedder::with_model("text-embedding-004", STUB_DIMENSIONS);
        assert!(matches!(
            index.check_compatible(&other_model),
            Err(Error::IndexMismatch { .. })
        ));

        let other_dims = StubEmbedder::with_model("stub-embedding-v1", 64);
        assert!(matches!(
            index.check_compatible(&other_dims),
            Err(Error::IndexMismatch { .. })
        ));
    }
}
