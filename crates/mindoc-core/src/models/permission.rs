use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Who a download grant is attached to. Exactly one of the two; the API
/// layer validates the request body before this type is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSubject {
    User(Uuid),
    Group(Uuid),
}

impl PermissionSubject {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            PermissionSubject::User(id) => Some(*id),
            PermissionSubject::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<Uuid> {
        match self {
            PermissionSubject::User(_) => None,
            PermissionSubject::Group(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for PermissionSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionSubject::User(id) => write!(f, "user {}", id),
            PermissionSubject::Group(id) => write!(f, "group {}", id),
        }
    }
}

/// A download grant: one row per (document, user) or (document, group).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DocumentPermission {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub inserted_at: DateTime<Utc>,
    pub inserted_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentPermissionResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    pub inserted_at: DateTime<Utc>,
}

impl From<DocumentPermission> for DocumentPermissionResponse {
    fn from(permission: DocumentPermission) -> Self {
        DocumentPermissionResponse {
            id: permission.id,
            document_id: permission.document_id,
            user_id: permission.user_id,
            group_id: permission.group_id,
            inserted_at: permission.inserted_at,
        }
    }
}
