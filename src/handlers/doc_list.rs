use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::models::{DocumentSummary, ErrorResponse};
use crate::AppState;

/// List all documents
pub async fn doc_list(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<DocumentSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let documents = app_state.store.list_documents().await.map_err(|e| {
        error!("Failed to list documents: {}", e);
        ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    })?;

    Ok(Json(documents))
}
