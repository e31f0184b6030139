//! Claim verification endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ClaimRequest, ClaimResponse};

pub const WELCOME_MESSAGE: &str =
    "Welcome to the political claims verification application. Enjoy your stay!";

/// GET / - greeting
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// POST /validate_claim - verify one claim against the policy documents
pub async fn validate_claim(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ClaimRequest>, JsonRejection>,
) -> Result<Json<ClaimResponse>> {
    let Json(request) = payload.map_err(|rejection| Error::validation(rejection.body_text()))?;
    let claim = request.input.trim();
    if claim.is_empty() {
        return Err(Error::validation("input must contain a claim"));
    }

    let start = Instant::now();
    tracing::info!("Checking claim: \"{}\"", claim);

    let deadline = state.request_timeout();
    let verification = tokio::time::timeout(deadline, state.verifier().verify(claim))
        .await
        .map_err(|_| {
            Error::Timeout(format!("claim verification exceeded {}s", deadline.as_secs()))
        })??;

    tracing::info!(
        "Claim answered in {}ms with {} sources",
        start.elapsed().as_millis(),
        verification.hits.len()
    );

    Ok(Json(ClaimResponse::new(
        request.input,
        verification.verdict,
        &verification.hits,
    )))
}
