//! Document permission endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mindoc_core::models::{DocumentPermissionResponse, PermissionSubject};
use mindoc_core::AppError;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Grant or revocation target: exactly one of `user_id` or `group_id`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = validate_exactly_one_subject))]
pub struct PermissionRequest {
    pub user_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
}

fn validate_exactly_one_subject(request: &PermissionRequest) -> Result<(), ValidationError> {
    match (request.user_id, request.group_id) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => {
            let mut error = ValidationError::new("subject");
            error.message = Some("Provide exactly one of user_id or group_id".into());
            Err(error)
        }
    }
}

impl PermissionRequest {
    fn subject(&self) -> Option<PermissionSubject> {
        match (self.user_id, self.group_id) {
            (Some(user_id), None) => Some(PermissionSubject::User(user_id)),
            (None, Some(group_id)) => Some(PermissionSubject::Group(group_id)),
            _ => None,
        }
    }
}

/// Grant a user or group download access to a document.
#[utoipa::path(
    post,
    path = "/api/v1/documents/{id}/permissions",
    tag = "permissions",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = PermissionRequest,
    responses(
        (status = 201, description = "Grant created", body = DocumentPermissionResponse),
        (status = 400, description = "Invalid subject", body = ErrorResponse),
        (status = 403, description = "Caller may not administer grants", body = ErrorResponse),
        (status = 404, description = "No such document", body = ErrorResponse),
        (status = 409, description = "Grant already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %identity.user_id, username = %identity.username)
)]
pub async fn grant_permission(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<PermissionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_elevated()?;
    let subject = request.subject().ok_or_else(|| {
        AppError::InvalidInput("Provide exactly one of user_id or group_id".to_string())
    })?;

    let permission = state.permissions.grant(&identity, id, subject).await?;
    Ok((
        StatusCode::CREATED,
        Json(DocumentPermissionResponse::from(permission)),
    ))
}

/// Remove a grant. Revoking a grant that does not exist is a 404.
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}/permissions",
    tag = "permissions",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = PermissionRequest,
    responses(
        (status = 204, description = "Grant removed"),
        (status = 400, description = "Invalid subject", body = ErrorResponse),
        (status = 403, description = "Caller may not administer grants", body = ErrorResponse),
        (status = 404, description = "No such document or grant", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %identity.user_id, username = %identity.username)
)]
pub async fn revoke_permission(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<PermissionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_elevated()?;
    let subject = request.subject().ok_or_else(|| {
        AppError::InvalidInput("Provide exactly one of user_id or group_id".to_string())
    })?;

    let removed = state.permissions.revoke(id, subject).await?;
    if !removed {
        return Err(HttpAppError(AppError::NotFound(format!(
            "No grant for {} on document {}",
            subject, id
        ))));
    }
    Ok(StatusCode::NO_CONTENT)
}
