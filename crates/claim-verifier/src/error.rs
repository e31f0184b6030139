//! Error types for the claim verifier

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::Path;
use thiserror::Error;

/// Result type alias for verifier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Claim verifier errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document could not be loaded
    #[error("Failed to load '{path}': {message}")]
    Load { path: String, message: String },

    /// Page translation failed
    #[error("Translation failed: {0}")]
    Translation(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Language model generation error
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Upstream rejected the request outright; retrying will not help
    #[error("Upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Persisted index failed validation
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Persisted index was built with a different embedder
    #[error("Index mismatch: index was built with {found}, but {expected} is configured")]
    IndexMismatch { expected: String, found: String },

    /// Vector of the wrong length
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Malformed inbound request
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Operation ran past its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a load error for a path
    pub fn load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a translation error
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a corrupt index error
    pub fn corrupt_index(message: impl Into<String>) -> Self {
        Self::CorruptIndex(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether a failed external call is worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Translation(_)
            | Error::Embedding(_)
            | Error::Generation(_)
            | Error::Timeout(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::Load { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "load_error", self.to_string())
            }
            Error::Translation(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "translation_error", msg.clone())
            }
            Error::Embedding(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "embedding_error", msg.clone())
            }
            Error::Generation(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "generation_error", msg.clone())
            }
            Error::Rejected { .. } => (StatusCode::BAD_GATEWAY, "upstream_error", self.to_string()),
            Error::CorruptIndex(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_index", msg.clone())
            }
            Error::IndexMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "index_mismatch", self.to_string())
            }
            Error::DimensionMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "dimension_mismatch", self.to_string())
            }
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Error::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "timeout", msg.clone()),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
