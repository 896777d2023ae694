//! Document download handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use futures::StreamExt;
use mindoc_core::AppError;
use uuid::Uuid;

use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Stream a document's file to an authorized caller.
///
/// Managers and admins may download anything; other users need a direct
/// or group grant. The body streams from the object store without being
/// buffered in the server.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/file",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "No download permission", body = ErrorResponse),
        (status = 404, description = "No such document", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %identity.user_id, username = %identity.username)
)]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (document, download) = state.documents.download(&identity, id).await?;

    let body_stream = download.stream.map(|chunk| {
        chunk.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let content_type = download
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let content_disposition = format!("attachment; filename=\"{}\"", document.name);

    let mut response = axum::http::Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition)
        .header(header::CACHE_CONTROL, "private, no-store");
    if let Some(length) = download.content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }

    response
        .body(Body::from_stream(body_stream))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}
