use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use herald_core::Policy;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Generic error response shared by the API handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn internal(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Get the current campaign policy
pub async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Policy>, (StatusCode, Json<ErrorResponse>)> {
    state
        .policy()
        .load()
        .map(Json)
        .map_err(ErrorResponse::internal)
}

/// Replace the campaign policy
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(policy): Json<Policy>,
) -> Result<Json<Policy>, (StatusCode, Json<ErrorResponse>)> {
    match state.policy().save(&policy) {
        Ok(()) => Ok(Json(policy)),
        Err(e @ herald_core::PolicyError::Validation(_)) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => Err(ErrorResponse::internal(e)),
    }
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    collect_dynamic_metrics(&state).await;
    encode_metrics()
}
