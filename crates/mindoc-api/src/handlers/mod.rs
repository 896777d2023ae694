//! HTTP request handlers.

pub mod document_download;
pub mod document_get;
pub mod document_upload;
pub mod groups;
pub mod login;
pub mod permissions;
pub mod users;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. No dependencies are touched; a healthy process answers
/// even when the database or object store is down.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}
