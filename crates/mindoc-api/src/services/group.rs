//! Group and membership administration.

use std::sync::Arc;

use mindoc_core::models::{Group, UserGroupMembership};
use mindoc_core::AppError;
use mindoc_db::GroupRepositoryTrait;
use uuid::Uuid;

use crate::auth::models::Identity;

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepositoryTrait>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepositoryTrait>) -> Self {
        Self { groups }
    }

    pub async fn create(&self, identity: &Identity, name: &str) -> Result<Group, AppError> {
        let group = self.groups.insert(name, &identity.username).await?;
        tracing::info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(group)
    }

    pub async fn get(&self, id: Uuid) -> Result<Group, AppError> {
        self.groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Group>, AppError> {
        self.groups.list().await
    }

    /// Delete a group along with its memberships and grants.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.groups.delete(id).await? {
            return Err(AppError::NotFound(format!("Group {} not found", id)));
        }
        tracing::info!(group_id = %id, "Group deleted");
        Ok(())
    }

    pub async fn add_member(
        &self,
        identity: &Identity,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<UserGroupMembership, AppError> {
        let membership = self
            .groups
            .add_member(group_id, user_id, &identity.username)
            .await?;
        tracing::info!(group_id = %group_id, user_id = %user_id, "Group member added");
        Ok(membership)
    }

    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if !self.groups.remove_member(group_id, user_id).await? {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of group {}",
                user_id, group_id
            )));
        }
        tracing::info!(group_id = %group_id, user_id = %user_id, "Group member removed");
        Ok(())
    }
}
