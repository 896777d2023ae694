use mindoc_core::models::{NewUser, User, UserRole};
use mindoc_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::retry::{is_unique_violation, with_retry};

/// Trait for user repository operations
#[async_trait::async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Insert a user. Fails with `Conflict` when the username is taken.
    async fn insert(&self, new: NewUser) -> Result<User, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Set a user's role. Returns the number of rows affected.
    async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
        updated_by: &str,
    ) -> Result<u64, AppError>;

    /// Replace a user's password hash. Returns the number of rows affected.
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_by: &str,
    ) -> Result<u64, AppError>;

    /// Delete a user. Returns true when a row was actually deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepositoryTrait for PostgresUserRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "users", db.operation = "insert"))]
    async fn insert(&self, new: NewUser) -> Result<User, AppError> {
        let result = with_retry("users.insert", || async {
            sqlx::query_as::<Postgres, User>(
                r#"
                INSERT INTO users (username, password_hash, role, inserted_by)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(&new.username)
            .bind(&new.password_hash)
            .bind(new.role)
            .bind(&new.inserted_by)
            .fetch_one(&self.pool)
            .await
        })
        .await;

        match result {
            Err(ref err) if is_unique_violation(err) => {
                Err(AppError::Conflict("Username already taken".to_string()))
            }
            other => other,
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        with_retry("users.find_by_username", || async {
            sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "users", db.operation = "select", db.record_id = %id)
    )]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        with_retry("users.find_by_id", || async {
            sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<User>, AppError> {
        with_retry("users.list", || async {
            sqlx::query_as::<Postgres, User>("SELECT * FROM users ORDER BY username")
                .fetch_all(&self.pool)
                .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "users", db.operation = "update", db.record_id = %id)
    )]
    async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
        updated_by: &str,
    ) -> Result<u64, AppError> {
        let result = with_retry("users.update_role", || async {
            sqlx::query(
                "UPDATE users SET role = $2, updated_at = NOW(), updated_by = $3 WHERE id = $1",
            )
            .bind(id)
            .bind(role)
            .bind(updated_by)
            .execute(&self.pool)
            .await
        })
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(
        skip(self, password_hash),
        fields(db.table = "users", db.operation = "update", db.record_id = %id)
    )]
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_by: &str,
    ) -> Result<u64, AppError> {
        let result = with_retry("users.update_password", || async {
            sqlx::query(
                r#"
                UPDATE users
                SET password_hash = $2, updated_at = NOW(), updated_by = $3
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(password_hash)
            .bind(updated_by)
            .execute(&self.pool)
            .await
        })
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "users", db.operation = "delete", db.record_id = %id)
    )]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = with_retry("users.delete", || async {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
