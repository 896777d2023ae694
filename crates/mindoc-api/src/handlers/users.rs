//! User administration endpoints. All of them are admin-only.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mindoc_core::models::{UserResponse, UserRole};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Defaults to the plain user role when omitted.
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(username = %identity.username))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let user = state
        .users
        .create(&identity, &request.username, &request.password, request.role)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let users = state.users.list().await?;
    let responses: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// User by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let user = state.users.get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Change a user's role.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 204, description = "Role updated"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(username = %identity.username))]
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    state.users.update_role(&identity, id, request.role).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reset a user's password.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/password",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdatePasswordRequest,
    responses(
        (status = 204, description = "Password updated"),
        (status = 400, description = "Password too short", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(username = %identity.username))]
pub async fn update_user_password(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    state
        .users
        .update_password(&identity, id, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user. Their direct grants and group memberships go with them.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
