//! Group administration endpoints. All of them are admin-only.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use mindoc_core::models::{GroupResponse, UserGroupMembership};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipResponse {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub inserted_at: DateTime<Utc>,
}

impl From<UserGroupMembership> for MembershipResponse {
    fn from(membership: UserGroupMembership) -> Self {
        MembershipResponse {
            group_id: membership.group_id,
            user_id: membership.user_id,
            inserted_at: membership.inserted_at,
        }
    }
}

/// Create a group.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 409, description = "Group name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(username = %identity.username))]
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let group = state.groups.create(&identity, &request.name).await?;
    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// List groups.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "groups",
    responses(
        (status = 200, description = "All groups", body = [GroupResponse]),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let groups = state.groups.list().await?;
    let responses: Vec<GroupResponse> = groups.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Group by id.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "The group", body = GroupResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such group", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let group = state.groups.get(id).await?;
    Ok(Json(GroupResponse::from(group)))
}

/// Delete a group. Its memberships and grants go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such group", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    state.groups.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to a group.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/members",
    tag = "groups",
    params(("id" = Uuid, Path, description = "Group id")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MembershipResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such group or user", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(username = %identity.username))]
pub async fn add_group_member(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    let membership = state
        .groups
        .add_member(&identity, id, request.user_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MembershipResponse::from(membership)),
    ))
}

/// Remove a user from a group.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}/members/{user_id}",
    tag = "groups",
    params(
        ("id" = Uuid, Path, description = "Group id"),
        ("user_id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No such membership", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(username = %identity.username))]
pub async fn remove_group_member(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    identity.require_admin()?;
    state.groups.remove_member(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
