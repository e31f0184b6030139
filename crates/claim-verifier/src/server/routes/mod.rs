//! HTTP routes for the claim verifier

pub mod claims;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build the public routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(claims::welcome))
        .route("/validate_claim", post(claims::validate_claim))
}
