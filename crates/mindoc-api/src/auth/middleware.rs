//! Bearer-token authentication middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mindoc_core::models::UserRole;
use mindoc_core::AppError;

use crate::auth::jwt::JwtService;
use crate::auth::models::Identity;
use crate::error::HttpAppError;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
}

/// Verify the Authorization header and stash the caller's [`Identity`]
/// in request extensions for handlers to extract.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => header,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Authorization header must be a bearer token".to_string(),
        ))
        .into_response();
    };

    let claims = match auth_state.jwt.verify(token) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    // Tokens minted before a role rename would carry an unknown role string.
    let role = match claims.role.parse::<UserRole>() {
        Ok(role) => role,
        Err(_) => {
            return HttpAppError(AppError::Unauthorized(
                "Token carries an unknown role".to_string(),
            ))
            .into_response();
        }
    };

    request.extensions_mut().insert(Identity {
        user_id: claims.sub,
        username: claims.username,
        role,
    });

    next.run(request).await
}
