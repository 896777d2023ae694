//! Authentication types: token claims and the extracted caller identity.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use mindoc_core::models::UserRole;
use mindoc_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorResponse;

/// Claims carried by every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id.
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued at, seconds since epoch.
    pub iat: i64,
}

/// Authenticated caller, decoded from the bearer token by the auth
/// middleware and stored in request extensions.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl Identity {
    /// Manager or Admin. Required for uploads and permission changes.
    pub fn require_elevated(&self) -> Result<(), AppError> {
        if self.role.is_elevated() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Manager or admin role required".to_string(),
            ))
        }
    }

    /// Admin only. Required for user and group administration.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }
}

/// Extractor so handlers can take `identity: Identity` directly.
/// The auth middleware must have run; a missing extension means the
/// route was wired outside the protected router.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Missing authentication context".to_string(),
                details: None,
                error_type: None,
                code: "UNAUTHORIZED".to_string(),
                recoverable: false,
                suggested_action: Some("Provide a bearer token".to_string()),
            }),
        ))
    }
}
