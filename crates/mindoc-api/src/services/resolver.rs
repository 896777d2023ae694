//! Download permission resolution.

use std::sync::Arc;

use mindoc_core::AppError;
use mindoc_db::PermissionRepositoryTrait;
use uuid::Uuid;

/// Answers "may this user download this document" from stored grants.
///
/// Only data-driven grants are consulted here; the role bypass for
/// managers and admins happens in the document service before this
/// resolver is asked.
#[derive(Clone)]
pub struct PermissionResolver {
    permissions: Arc<dyn PermissionRepositoryTrait>,
}

impl PermissionResolver {
    pub fn new(permissions: Arc<dyn PermissionRepositoryTrait>) -> Self {
        Self { permissions }
    }

    /// True when the user holds a direct grant or belongs to a granted
    /// group. Both lookups run so a failure in either surfaces instead of
    /// being masked by short-circuiting.
    pub async fn can_download(&self, user_id: Uuid, document_id: Uuid) -> Result<bool, AppError> {
        let direct = self
            .permissions
            .user_has_direct_grant(document_id, user_id)
            .await?;
        let via_group = self
            .permissions
            .user_has_group_grant(document_id, user_id)
            .await?;
        Ok(direct || via_group)
    }
}
