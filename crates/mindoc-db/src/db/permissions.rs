use mindoc_core::models::{DocumentPermission, PermissionSubject};
use mindoc_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::retry::{is_foreign_key_violation, is_unique_violation, with_retry};

/// Trait for permission repository operations
#[async_trait::async_trait]
pub trait PermissionRepositoryTrait: Send + Sync {
    /// Record a grant for a user or a group. Fails with `Conflict` when the
    /// identical grant already exists and `NotFound` when the subject row
    /// does not.
    async fn grant(
        &self,
        document_id: Uuid,
        subject: &PermissionSubject,
        granted_by: &str,
    ) -> Result<DocumentPermission, AppError>;

    /// Remove a grant. Returns true when a row was actually deleted.
    async fn revoke(
        &self,
        document_id: Uuid,
        subject: &PermissionSubject,
    ) -> Result<bool, AppError>;

    /// Whether the user holds a direct grant on the document.
    async fn user_has_direct_grant(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Whether any group the user belongs to holds a grant on the document.
    async fn user_has_group_grant(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PermissionRepositoryTrait for PostgresPermissionRepository {
    #[tracing::instrument(
        skip(self),
        fields(db.table = "document_permissions", db.operation = "insert", db.record_id = %document_id)
    )]
    async fn grant(
        &self,
        document_id: Uuid,
        subject: &PermissionSubject,
        granted_by: &str,
    ) -> Result<DocumentPermission, AppError> {
        let result = with_retry("document_permissions.grant", || async {
            let query = match subject {
                PermissionSubject::User(user_id) => {
                    sqlx::query_as::<Postgres, DocumentPermission>(
                        r#"
                        INSERT INTO document_permissions (document_id, user_id, inserted_by)
                        VALUES ($1, $2, $3)
                        RETURNING *
                        "#,
                    )
                    .bind(document_id)
                    .bind(user_id)
                }
                PermissionSubject::Group(group_id) => {
                    sqlx::query_as::<Postgres, DocumentPermission>(
                        r#"
                        INSERT INTO document_permissions (document_id, group_id, inserted_by)
                        VALUES ($1, $2, $3)
                        RETURNING *
                        "#,
                    )
                    .bind(document_id)
                    .bind(group_id)
                }
            };
            query.bind(granted_by).fetch_one(&self.pool).await
        })
        .await;

        match result {
            Err(ref err) if is_unique_violation(err) => Err(AppError::Conflict(
                "Permission already granted".to_string(),
            )),
            Err(ref err) if is_foreign_key_violation(err) => Err(AppError::NotFound(
                "User or group does not exist".to_string(),
            )),
            other => other,
        }
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "document_permissions", db.operation = "delete", db.record_id = %document_id)
    )]
    async fn revoke(
        &self,
        document_id: Uuid,
        subject: &PermissionSubject,
    ) -> Result<bool, AppError> {
        let result = with_retry("document_permissions.revoke", || async {
            let query = match subject {
                PermissionSubject::User(user_id) => sqlx::query(
                    "DELETE FROM document_permissions WHERE document_id = $1 AND user_id = $2",
                )
                .bind(document_id)
                .bind(user_id),
                PermissionSubject::Group(group_id) => sqlx::query(
                    "DELETE FROM document_permissions WHERE document_id = $1 AND group_id = $2",
                )
                .bind(document_id)
                .bind(group_id),
            };
            query.execute(&self.pool).await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "document_permissions", db.operation = "select", db.record_id = %document_id)
    )]
    async fn user_has_direct_grant(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        with_retry("document_permissions.user_has_direct_grant", || async {
            sqlx::query_scalar::<Postgres, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM document_permissions
                    WHERE document_id = $1 AND user_id = $2
                )
                "#,
            )
            .bind(document_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "document_permissions", db.operation = "select", db.record_id = %document_id)
    )]
    async fn user_has_group_grant(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        with_retry("document_permissions.user_has_group_grant", || async {
            sqlx::query_scalar::<Postgres, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1
                    FROM document_permissions dp
                    JOIN user_groups ug ON ug.group_id = dp.group_id
                    WHERE dp.document_id = $1 AND ug.user_id = $2
                )
                "#,
            )
            .bind(document_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
        })
        .await
    }
}
