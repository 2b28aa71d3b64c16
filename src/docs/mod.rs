use crate::models::*;
use utoipa::OpenApi;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Create a new document
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created at version 0", body = DocumentRow)
    )
)]
#[allow(dead_code)]
pub async fn doc_create_doc() {}

/// List documents
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "All documents, id and title only", body = [DocumentSummary])
    )
)]
#[allow(dead_code)]
pub async fn doc_list_doc() {}

/// Get a document by ID
#[utoipa::path(
    get,
    path = "/api/documents/{doc_id}",
    params(
        ("doc_id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "The full document", body = DocumentRow),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn doc_get_doc() {}

/// Delete a document by ID
#[utoipa::path(
    delete,
    path = "/api/documents/{doc_id}",
    params(
        ("doc_id" = String, Path, description = "Document UUID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn doc_delete_doc() {}

/// Operator diagnostics
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Hub counters and system stats", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        doc_create_doc,
        doc_list_doc,
        doc_get_doc,
        doc_delete_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse,
            CreateDocumentRequest,
            DocumentRow,
            DocumentSummary,
            DiagnosticsResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "api", description = "Document catalog and diagnostics")
    )
)]
pub struct ApiDoc;
