use mindoc_core::models::{Group, UserGroupMembership};
use mindoc_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::retry::{is_foreign_key_violation, is_unique_violation, with_retry};

/// Trait for group repository operations
#[async_trait::async_trait]
pub trait GroupRepositoryTrait: Send + Sync {
    /// Insert a group. Fails with `Conflict` when the name is taken.
    async fn insert(&self, name: &str, inserted_by: &str) -> Result<Group, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, AppError>;

    async fn list(&self) -> Result<Vec<Group>, AppError>;

    /// Delete a group and its memberships. Returns true when a row was
    /// actually deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Add a user to a group. Fails with `Conflict` when the membership
    /// already exists and `NotFound` when the user or group is missing.
    async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        inserted_by: &str,
    ) -> Result<UserGroupMembership, AppError>;

    /// Remove a user from a group. Returns true when a membership was
    /// actually deleted.
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GroupRepositoryTrait for PostgresGroupRepository {
    #[tracing::instrument(skip(self), fields(db.table = "groups", db.operation = "insert"))]
    async fn insert(&self, name: &str, inserted_by: &str) -> Result<Group, AppError> {
        let result = with_retry("groups.insert", || async {
            sqlx::query_as::<Postgres, Group>(
                "INSERT INTO groups (name, inserted_by) VALUES ($1, $2) RETURNING *",
            )
            .bind(name)
            .bind(inserted_by)
            .fetch_one(&self.pool)
            .await
        })
        .await;

        match result {
            Err(ref err) if is_unique_violation(err) => {
                Err(AppError::Conflict("Group name already taken".to_string()))
            }
            other => other,
        }
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "groups", db.operation = "select", db.record_id = %id)
    )]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, AppError> {
        with_retry("groups.find_by_id", || async {
            sqlx::query_as::<Postgres, Group>("SELECT * FROM groups WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "groups", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Group>, AppError> {
        with_retry("groups.list", || async {
            sqlx::query_as::<Postgres, Group>("SELECT * FROM groups ORDER BY name")
                .fetch_all(&self.pool)
                .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "groups", db.operation = "delete", db.record_id = %id)
    )]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = with_retry("groups.delete", || async {
            sqlx::query("DELETE FROM groups WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "user_groups", db.operation = "insert", db.record_id = %group_id)
    )]
    async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        inserted_by: &str,
    ) -> Result<UserGroupMembership, AppError> {
        let result = with_retry("user_groups.add_member", || async {
            sqlx::query_as::<Postgres, UserGroupMembership>(
                r#"
                INSERT INTO user_groups (group_id, user_id, inserted_by)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(group_id)
            .bind(user_id)
            .bind(inserted_by)
            .fetch_one(&self.pool)
            .await
        })
        .await;

        match result {
            Err(ref err) if is_unique_violation(err) => Err(AppError::Conflict(
                "User is already a member of the group".to_string(),
            )),
            Err(ref err) if is_foreign_key_violation(err) => Err(AppError::NotFound(
                "User or group does not exist".to_string(),
            )),
            other => other,
        }
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "user_groups", db.operation = "delete", db.record_id = %group_id)
    )]
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = with_retry("user_groups.remove_member", || async {
            sqlx::query("DELETE FROM user_groups WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
