//! Login endpoint.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use mindoc_core::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token to send as `Authorization: Bearer <token>`.
    pub token: String,
    pub user: UserResponse,
}

/// Exchange credentials for a bearer token.
///
/// Unknown usernames and wrong passwords are indistinguishable in the
/// response.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (token, user) = state.login.login(&request.username, &request.password).await?;
    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}
