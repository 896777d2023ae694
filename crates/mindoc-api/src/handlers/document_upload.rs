//! Document upload handler.
//!
//! The request body is consumed as a forward-only multipart stream:
//! metadata fields first, then the file part, whose bytes flow straight
//! into the object store without ever being buffered whole.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use mindoc_core::models::{DocumentResponse, UploadRequestBuilder};
use mindoc_core::AppError;

use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::ingest::boundary;
use crate::ingest::content_type;
use crate::ingest::reader::{Section, SectionReader};
use crate::state::AppState;

/// Upload a document as `multipart/form-data`.
///
/// Expected fields, in order: `name`, `description`, `category`, then the
/// file part. Unknown fields are ignored; a file arriving before the
/// metadata is complete fails the request.
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document uploaded", body = DocumentResponse),
        (status = 400, description = "Malformed multipart request", body = ErrorResponse),
        (status = 403, description = "Caller may not upload documents", body = ErrorResponse),
        (status = 409, description = "Document already exists", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse),
        (status = 500, description = "Upload failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, headers, multipart),
    fields(user_id = %identity.user_id, username = %identity.username)
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_elevated()?;

    // The boundary is validated from the headers before any body byte is read.
    let boundary = boundary::require_boundary(&headers)?;
    tracing::debug!(boundary_length = boundary.len(), "Multipart boundary accepted");

    let mut reader = SectionReader::new(multipart);
    let mut builder = UploadRequestBuilder::new();

    loop {
        match reader.next_section().await? {
            None => {
                return Err(HttpAppError(AppError::MalformedRequest(
                    "Request contains no file part".to_string(),
                )));
            }
            Some(Section::FormField { name, value }) => {
                if !builder.set_field(&name, value) {
                    tracing::debug!(field = %name, "Ignoring unknown form field");
                }
            }
            Some(Section::FilePart(file)) => {
                // Metadata must be complete before the file arrives.
                let request = builder.build(Utc::now())?;
                let content_type = content_type::authorize_content_type(
                    &file.file_name,
                    file.declared_content_type.as_deref(),
                    state.config.allowed_content_types(),
                )?;

                let stream = file.into_stream();
                let document = state
                    .documents
                    .upload_document(&identity, request, stream, &content_type)
                    .await?;

                return Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))));
            }
        }
    }
}
