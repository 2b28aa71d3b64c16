use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{diagnostics, doc_create, doc_delete, doc_get, doc_list};
use crate::AppState;

/// Create API routes
pub fn create_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", post(doc_create).get(doc_list))
        .route("/documents/:doc_id", get(doc_get).delete(doc_delete))
        .route("/diagnostics", get(diagnostics))
}
