use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::ErrorResponse;
use crate::AppState;

/// Delete a document by ID
///
/// Any session currently open for the document keeps editing in memory;
/// only its durable row is removed.
pub async fn doc_delete(
    State(app_state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let doc_uuid = Uuid::parse_str(&doc_id).map_err(|e| {
        error!("Invalid document UUID '{}': {}", doc_id, e);
        ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            format!("Invalid document UUID '{}'", doc_id),
        )
    })?;

    let deleted = app_state.store.delete_document(doc_uuid).await.map_err(|e| {
        error!("Failed to delete document '{}': {}", doc_uuid, e);
        ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    })?;

    if !deleted {
        return Err(ErrorResponse::reply(
            StatusCode::NOT_FOUND,
            "Document not found",
        ));
    }

    info!("Document {} deleted", doc_uuid);
    Ok(StatusCode::NO_CONTENT)
}
