//! Document metadata endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use mindoc_core::models::DocumentResponse;
use uuid::Uuid;

use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// List document metadata, newest first. Pending uploads appear with
/// `uploaded: false`.
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "documents",
    responses(
        (status = 200, description = "All documents", body = [DocumentResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _identity))]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    _identity: Identity,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state.documents.list().await?;
    let responses: Vec<DocumentResponse> = documents.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Document metadata by id.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such document", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _identity))]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    _identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state.documents.get(id).await?;
    Ok(Json(DocumentResponse::from(document)))
}
