//! Persisted run record API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use herald_core::{RunError, RunRecord, RunSummary};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for run listings
const MAX_LIMIT: usize = 200;

/// Default limit for run listings
const DEFAULT_LIMIT: usize = 20;

/// Query parameters for listing runs
#[derive(Debug, Deserialize)]
pub struct ListRunsParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub deleted: usize,
}

/// List persisted runs, most recent first
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListRunsParams>,
) -> Result<Json<Vec<RunSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    state
        .runs()
        .list(limit)
        .map(Json)
        .map_err(ErrorResponse::internal)
}

/// Load one persisted run
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RunRecord>, (StatusCode, Json<ErrorResponse>)> {
    match state.runs().get(&id) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Run not found: {id}"),
            }),
        )),
        Err(e) => Err(ErrorResponse::internal(e)),
    }
}

/// Delete one persisted run
pub async fn delete_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.runs().delete(&id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(RunError::NotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Run not found: {id}"),
            }),
        )),
        Err(e) => Err(ErrorResponse::internal(e)),
    }
}

/// Delete all persisted runs
pub async fn clear_runs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .runs()
        .clear()
        .map(|deleted| Json(ClearResponse { deleted }))
        .map_err(ErrorResponse::internal)
}
