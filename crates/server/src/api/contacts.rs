//! Contact API handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use herald_core::{
    parse_contacts, render_contacts, BulkAction, Contact, ContactError, ContactPatch, NewContact,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for bulk contact operations
#[derive(Debug, Deserialize)]
pub struct BulkBody {
    pub action: BulkAction,
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Response for bulk operations
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: usize,
}

/// Response for CSV import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

fn not_found(id: i64) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Contact not found: {id}"),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// List all contacts
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Contact>>, (StatusCode, Json<ErrorResponse>)> {
    state
        .contacts()
        .list()
        .map(Json)
        .map_err(ErrorResponse::internal)
}

/// Add a contact
pub async fn add_contact(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewContact>,
) -> Result<(StatusCode, Json<Contact>), (StatusCode, Json<ErrorResponse>)> {
    state
        .contacts()
        .add(new)
        .map(|contact| (StatusCode::CREATED, Json(contact)))
        .map_err(ErrorResponse::internal)
}

/// Partially update a contact
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, (StatusCode, Json<ErrorResponse>)> {
    match state.contacts().update(id, patch) {
        Ok(contact) => Ok(Json(contact)),
        Err(ContactError::NotFound(id)) => Err(not_found(id)),
        Err(e) => Err(ErrorResponse::internal(e)),
    }
}

/// Delete a contact (remaining ids are renumbered)
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.contacts().delete(id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(ContactError::NotFound(id)) => Err(not_found(id)),
        Err(e) => Err(ErrorResponse::internal(e)),
    }
}

/// Bulk enable/disable/delete
pub async fn bulk_contacts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkBody>,
) -> Result<Json<BulkResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .contacts()
        .bulk(body.action, &body.ids)
        .map(|affected| Json(BulkResponse { affected }))
        .map_err(ErrorResponse::internal)
}

/// Import contacts from an uploaded CSV file (multipart field "file")
pub async fn import_contacts(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut data: Option<String> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid multipart payload: {e}"),
            }),
        )
    })? {
        if field.name() == Some("file") {
            let text = field.text().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read uploaded file: {e}"),
                    }),
                )
            })?;
            data = Some(text);
        }
    }

    let Some(data) = data else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing 'file' field".to_string(),
            }),
        ));
    };

    let rows = parse_contacts(&data).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    state
        .contacts()
        .append_all(rows)
        .map(|imported| Json(ImportResponse { imported }))
        .map_err(ErrorResponse::internal)
}

/// Export all contacts as a CSV attachment
pub async fn export_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let contacts = state.contacts().list().map_err(ErrorResponse::internal)?;
    let csv = render_contacts(&contacts).map_err(ErrorResponse::internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"contacts_{}.csv\"",
                    chrono::Utc::now().format("%Y%m%d")
                ),
            ),
        ],
        csv,
    ))
}
