//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use mindoc_core::models;

/// Registers the bearer token scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mindoc API",
        version = "0.1.0",
        description = "Document storage and access-control API. Documents stream to object storage through chunked uploads; downloads are gated by per-user and per-group grants, with managers and admins bypassing the grant lookup. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Health
        handlers::healthz,
        // Auth
        handlers::login::login,
        // Documents
        handlers::document_upload::upload_document,
        handlers::document_get::list_documents,
        handlers::document_get::get_document,
        handlers::document_download::download_document,
        // Permissions
        handlers::permissions::grant_permission,
        handlers::permissions::revoke_permission,
        // Users
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user_role,
        handlers::users::update_user_password,
        handlers::users::delete_user,
        // Groups
        handlers::groups::create_group,
        handlers::groups::list_groups,
        handlers::groups::get_group,
        handlers::groups::delete_group,
        handlers::groups::add_group_member,
        handlers::groups::remove_group_member,
    ),
    components(
        schemas(
            // Core models
            models::DocumentResponse,
            models::UserResponse,
            models::UserRole,
            models::GroupResponse,
            models::DocumentPermissionResponse,
            // Request/response bodies
            handlers::login::LoginRequest,
            handlers::login::LoginResponse,
            handlers::permissions::PermissionRequest,
            handlers::users::CreateUserRequest,
            handlers::users::UpdateRoleRequest,
            handlers::users::UpdatePasswordRequest,
            handlers::groups::CreateGroupRequest,
            handlers::groups::AddMemberRequest,
            handlers::groups::MembershipResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Process liveness"),
        (name = "auth", description = "Login and token issuance"),
        (name = "documents", description = "Document upload, metadata, and download operations"),
        (name = "permissions", description = "Per-document download grants for users and groups"),
        (name = "users", description = "User administration"),
        (name = "groups", description = "Group and membership administration")
    )
)]
pub struct ApiDoc;

/// Get the OpenAPI specification
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
