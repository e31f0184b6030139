//! Configuration for the claim verifier
//!
//! Values come from defaults, an optional TOML file, then environment
//! overrides, in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::RetryPolicy;

/// Main verifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerifierConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Gemini API configuration (embeddings, translation, generation)
    pub gemini: GeminiConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Vector index configuration
    pub index: IndexConfig,
    /// Source document ingestion configuration
    pub ingestion: IngestionConfig,
    /// Retry policy for external model calls
    pub retry: RetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Deadline for a single claim verification
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:5173".to_string(),
            ],
            request_timeout_secs: 60,
        }
    }
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (normally supplied through `GOOGLE_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Generative Language API base URL
    pub base_url: String,
    /// Model used for claim verification
    pub generation_model: String,
    /// Model used for page translation
    pub translation_model: String,
    /// Embedding model; must match between index build and serving
    pub embedding_model: String,
    /// Requested embedding dimensions
    pub embedding_dimensions: usize,
    /// Temperature for generation and translation
    pub temperature: f32,
    /// Maximum tokens in a model response
    pub max_output_tokens: u32,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            generation_model: "gemini-2.0-flash-001".to_string(),
            translation_model: "gemini-2.0-flash-001".to_string(),
            embedding_model: "gemini-embedding-001".to_string(),
            embedding_dimensions: 768,
            temperature: 0.0,
            max_output_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the persisted index
    pub path: PathBuf,
    /// Chunks retrieved per claim
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("claim_index"),
            top_k: 7,
        }
    }
}

/// What to do when one source document in a batch cannot be loaded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Fail the whole batch
    #[default]
    Abort,
    /// Log the failure and continue with the remaining files
    Skip,
}

/// Source document ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Documents used to build the index when none is persisted
    pub documents: Vec<PathBuf>,
    /// Language the documents are written in
    pub source_language: String,
    /// Batch failure policy
    pub on_load_error: LoadFailurePolicy,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            source_language: "Norwegian".to_string(),
            on_load_error: LoadFailurePolicy::Abort,
        }
    }
}

/// Retry configuration for external calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards
    pub base_delay_ms: u64,
    /// Upper bound on a single delay
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl RetryConfig {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl VerifierConfig {
    pub const ENV_CONFIG_PATH: &'static str = "CLAIM_VERIFIER_CONFIG";
    const ENV_API_KEY: &'static str = "GOOGLE_API_KEY";
    const ENV_FRONTEND_URL: &'static str = "FRONTEND_URL";
    const ENV_INDEX_PATH: &'static str = "CLAIM_INDEX_PATH";
    const ENV_HOST: &'static str = "CLAIM_VERIFIER_HOST";
    const ENV_PORT: &'static str = "CLAIM_VERIFIER_PORT";
    const ENV_DOCUMENTS: &'static str = "CLAIM_DOCUMENTS";

    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML configuration text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(Self::ENV_API_KEY) {
            self.gemini.api_key = Some(key.trim().to_string());
        }
        if let Some(origin) = non_empty(Self::ENV_FRONTEND_URL) {
            let origin = origin.trim().trim_end_matches('/').to_string();
            if !self.server.allowed_origins.contains(&origin) {
                self.server.allowed_origins.push(origin);
            }
        }
        if let Some(path) = non_empty(Self::ENV_INDEX_PATH) {
            self.index.path = PathBuf::from(path);
        }
        if let Some(host) = non_empty(Self::ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = non_empty(Self::ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a port number, got '{}'", Self::ENV_PORT, port))
            })?;
        }
        if let Some(documents) = non_empty(Self::ENV_DOCUMENTS) {
            self.ingestion.documents = documents
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        Ok(())
    }

    /// Check settings that would otherwise fail deep inside the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.as_deref().map_or(true, |k| k.is_empty()) {
            return Err(Error::Config(format!(
                "{} is not set",
                Self::ENV_API_KEY
            )));
        }
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.index.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
