//! Dispatch control API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use herald_core::{DispatchError, RunRecord};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Request body for starting a run
#[derive(Debug, Default, Deserialize)]
pub struct StartBody {
    /// Override the policy's dry-run default for this run.
    pub dry_run: Option<bool>,
}

/// Response for start/stop
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Start a dispatch run
pub async fn start_dispatch(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartBody>>,
) -> Result<Json<ControlResponse>, (StatusCode, Json<ControlResponse>)> {
    let dry_run = body.and_then(|b| b.dry_run);

    match state.dispatcher().start(dry_run).await {
        Ok(()) => Ok(Json(ControlResponse {
            accepted: true,
            reason: None,
        })),
        Err(e @ DispatchError::AlreadyRunning) => Err((
            StatusCode::CONFLICT,
            Json(ControlResponse {
                accepted: false,
                reason: Some(e.to_string()),
            }),
        )),
        // Terminal policy violation: the run record carries the detail.
        Err(e @ DispatchError::QuotaExhausted(_)) => Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ControlResponse {
                accepted: false,
                reason: Some(e.to_string()),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ControlResponse {
                accepted: false,
                reason: Some(e.to_string()),
            }),
        )),
    }
}

/// Request cancellation of the active run
pub async fn stop_dispatch(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    state.dispatcher().stop();
    Json(ControlResponse {
        accepted: true,
        reason: None,
    })
}

/// Snapshot of the current run record
pub async fn dispatch_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RunRecord>, (StatusCode, Json<ErrorResponse>)> {
    Ok(Json(state.dispatcher().status().await))
}
