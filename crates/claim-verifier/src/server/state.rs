//! Application state for the HTTP server

use std::sync::Arc;
use std::time::Duration;

use crate::config::VerifierConfig;
use crate::verifier::ClaimVerifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: VerifierConfig,
    /// Verifier built or loaded at startup
    verifier: Arc<ClaimVerifier>,
}

impl AppState {
    /// Create state around an initialized verifier
    pub fn new(config: VerifierConfig, verifier: Arc<ClaimVerifier>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, verifier }),
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.inner.config
    }

    pub fn verifier(&self) -> &Arc<ClaimVerifier> {
        &self.inner.verifier
    }

    /// Deadline for one claim request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.inner.config.server.request_timeout_secs)
    }

    /// Ready once the verifier has a non-empty index
    pub fn is_ready(&self) -> bool {
        !self.inner.verifier.index().is_empty()
    }
}
