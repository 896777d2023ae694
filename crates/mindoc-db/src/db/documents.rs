use mindoc_core::models::{Document, NewDocument};
use mindoc_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::retry::with_retry;

/// Trait for document repository operations
/// This abstracts the database implementation (PostgreSQL)
#[async_trait::async_trait]
pub trait DocumentRepositoryTrait: Send + Sync {
    /// Insert a pending (`uploaded = false`) document row.
    async fn insert_pending(&self, new: NewDocument) -> Result<Document, AppError>;

    /// Look up a document by its natural key `(name, description, category)`.
    /// The oldest row wins when the key is duplicated.
    async fn find_by_natural_key(
        &self,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<Option<Document>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    async fn list(&self) -> Result<Vec<Document>, AppError>;

    /// Flip the uploaded flag. Returns the number of rows affected so the
    /// caller can detect a row that vanished between the two phases.
    async fn mark_uploaded(&self, id: Uuid, updated_by: &str) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DocumentRepositoryTrait for PostgresDocumentRepository {
    #[tracing::instrument(
        skip(self, new),
        fields(db.table = "documents", db.operation = "insert")
    )]
    async fn insert_pending(&self, new: NewDocument) -> Result<Document, AppError> {
        // The natural key carries no unique constraint, so two uploads
        // racing past the duplicate check can both insert. The oldest row
        // wins every later lookup and the loser stays invisible while
        // `uploaded` remains false.
        with_retry("documents.insert_pending", || async {
            sqlx::query_as::<Postgres, Document>(
                r#"
                INSERT INTO documents (name, description, category, storage_key, uploaded, inserted_by)
                VALUES ($1, $2, $3, $4, FALSE, $5)
                RETURNING *
                "#,
            )
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.category)
            .bind(&new.storage_key)
            .bind(&new.inserted_by)
            .fetch_one(&self.pool)
            .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self, description),
        fields(db.table = "documents", db.operation = "select")
    )]
    async fn find_by_natural_key(
        &self,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<Option<Document>, AppError> {
        with_retry("documents.find_by_natural_key", || async {
            sqlx::query_as::<Postgres, Document>(
                r#"
                SELECT * FROM documents
                WHERE name = $1 AND description = $2 AND category = $3
                ORDER BY inserted_at
                LIMIT 1
                "#,
            )
            .bind(name)
            .bind(description)
            .bind(category)
            .fetch_optional(&self.pool)
            .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "documents", db.operation = "select", db.record_id = %id)
    )]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        with_retry("documents.find_by_id", || async {
            sqlx::query_as::<Postgres, Document>("SELECT * FROM documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Document>, AppError> {
        with_retry("documents.list", || async {
            sqlx::query_as::<Postgres, Document>(
                "SELECT * FROM documents ORDER BY inserted_at DESC",
            )
            .fetch_all(&self.pool)
            .await
        })
        .await
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "documents", db.operation = "update", db.record_id = %id)
    )]
    async fn mark_uploaded(&self, id: Uuid, updated_by: &str) -> Result<u64, AppError> {
        let result = with_retry("documents.mark_uploaded", || async {
            sqlx::query(
                r#"
                UPDATE documents
                SET uploaded = TRUE, updated_at = NOW(), updated_by = $2
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(updated_by)
            .execute(&self.pool)
            .await
        })
        .await?;

        Ok(result.rows_affected())
    }
}
