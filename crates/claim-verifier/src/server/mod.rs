//! HTTP server for claim verification

pub mod routes;
pub mod state;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::verifier::ClaimVerifier;
use state::AppState;

/// Claim verifier HTTP server
pub struct VerifierServer {
    config: VerifierConfig,
    state: AppState,
}

impl VerifierServer {
    /// Create a server around an initialized verifier
    pub fn new(config: VerifierConfig, verifier: Arc<ClaimVerifier>) -> Self {
        let state = AppState::new(config.clone(), verifier);
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Result<Router> {
        build_router(self.state.clone())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router()?;

        tracing::info!("Starting claim verifier on http://{}", addr);
        tracing::info!(
            "Allowed origins: {}",
            self.config.server.allowed_origins.join(", ")
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        self.config.address()
    }
}

/// Assemble routes and middleware for the given state
pub fn build_router(state: AppState) -> Result<Router> {
    let origins = state
        .config()
        .server
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::Config(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    // Credentialed CORS cannot use wildcards, so methods and headers are mirrored
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .merge(routes::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
