use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::models::{CreateDocumentRequest, DocumentRow, ErrorResponse};
use crate::AppState;

/// Create a new document at version 0
pub async fn doc_create(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentRow>), (StatusCode, Json<ErrorResponse>)> {
    let document = app_state
        .store
        .create_document(&request.title, &request.content)
        .await
        .map_err(|e| {
            error!("Failed to create document '{}': {}", request.title, e);
            ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })?;

    Ok((StatusCode::CREATED, Json(document)))
}
