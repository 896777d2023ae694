//! User administration.

use std::sync::Arc;

use mindoc_core::models::{NewUser, User, UserRole};
use mindoc_core::AppError;
use mindoc_db::UserRepositoryTrait;
use uuid::Uuid;

use crate::auth::models::Identity;
use crate::auth::password;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { users }
    }

    /// Create a user. The password is hashed here; the plaintext never
    /// reaches the repository. New users default to the plain user role.
    pub async fn create(
        &self,
        identity: &Identity,
        username: &str,
        password: &str,
        role: Option<UserRole>,
    ) -> Result<User, AppError> {
        let password_hash = password::hash_password(password)?;
        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                password_hash,
                role: role.unwrap_or(UserRole::User),
                inserted_by: identity.username.clone(),
            })
            .await?;
        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    pub async fn update_role(
        &self,
        identity: &Identity,
        id: Uuid,
        role: UserRole,
    ) -> Result<(), AppError> {
        let updated = self.users.update_role(id, role, &identity.username).await?;
        if updated == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        tracing::info!(user_id = %id, role = %role, "User role updated");
        Ok(())
    }

    pub async fn update_password(
        &self,
        identity: &Identity,
        id: Uuid,
        password: &str,
    ) -> Result<(), AppError> {
        let password_hash = password::hash_password(password)?;
        let updated = self
            .users
            .update_password(id, &password_hash, &identity.username)
            .await?;
        if updated == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        tracing::info!(user_id = %id, "User password updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.users.delete(id).await? {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
