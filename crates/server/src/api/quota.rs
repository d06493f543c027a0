//! Quota API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use chrono::Utc;
use herald_core::QuotaView;

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
}

/// Rollover-aware view of today's quota consumption.
///
/// Pure read: a stale counter from a previous day reads as zero without
/// rewriting the persisted state.
pub async fn get_quota(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuotaView>, (StatusCode, Json<ErrorResponse>)> {
    let policy = state.policy().load().map_err(ErrorResponse::internal)?;
    Ok(Json(state.quota().peek(&policy, Utc::now())))
}

/// Zero today's counter
pub async fn reset_quota(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResetResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .quota()
        .reset(Utc::now())
        .map(|()| Json(ResetResponse { success: true }))
        .map_err(ErrorResponse::internal)
}
