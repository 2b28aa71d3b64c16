use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;
use uuid::Uuid;

use crate::models::{DocumentRow, ErrorResponse};
use crate::AppState;

/// Get a document by ID
pub async fn doc_get(
    State(app_state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocumentRow>, (StatusCode, Json<ErrorResponse>)> {
    let doc_uuid = Uuid::parse_str(&doc_id).map_err(|e| {
        error!("Invalid document UUID '{}': {}", doc_id, e);
        ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            format!("Invalid document UUID '{}'", doc_id),
        )
    })?;

    let document = app_state
        .store
        .get_document(doc_uuid)
        .await
        .map_err(|e| {
            error!("Failed to fetch document '{}': {}", doc_uuid, e);
            ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })?
        .ok_or_else(|| {
            ErrorResponse::reply(StatusCode::NOT_FOUND, "Document not found")
        })?;

    Ok(Json(document))
}
