//! Device API handlers (connection check and calibration helpers).

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use herald_core::DeviceStatus;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Request body for the tap test
#[derive(Debug, Deserialize)]
pub struct TapBody {
    pub x: u32,
    pub y: u32,
}

/// Response for the tap test
#[derive(Debug, Serialize)]
pub struct TapResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Screen size response
#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub width: u32,
    pub height: u32,
}

/// Check whether a device is attached
pub async fn check_device(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeviceStatus>, (StatusCode, Json<ErrorResponse>)> {
    state
        .driver()
        .check()
        .await
        .map(Json)
        .map_err(ErrorResponse::internal)
}

/// Tap the screen at explicit coordinates (send-button calibration)
pub async fn test_tap(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TapBody>,
) -> Json<TapResponse> {
    match state.driver().tap(body.x, body.y).await {
        Ok(()) => Json(TapResponse {
            success: true,
            error: None,
        }),
        Err(e) => Json(TapResponse {
            success: false,
            error: Some(e.to_string()),
        }),
    }
}

/// Physical screen size of the attached device
pub async fn screen_size(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScreenResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .driver()
        .screen_size()
        .await
        .map(|(width, height)| Json(ScreenResponse { width, height }))
        .map_err(ErrorResponse::internal)
}
