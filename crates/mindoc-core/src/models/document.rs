use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored document record.
///
/// `(name, description, category)` form the natural de-duplication key;
/// `storage_key` is the server-generated object-store key. A row with
/// `uploaded = false` is a half-finished upload: invisible to downloads and
/// permission changes, reusable by a retry of the same upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub storage_key: String,
    pub uploaded: bool,
    pub inserted_at: DateTime<Utc>,
    pub inserted_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl Document {
    /// Whether the document is visible to downloads and permission changes.
    pub fn is_available(&self) -> bool {
        self.uploaded
    }
}

/// Input for inserting a pending document row. The row starts with
/// `uploaded = false` and is flipped once the object-store upload finishes.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub description: String,
    pub category: String,
    pub storage_key: String,
    pub inserted_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub uploaded: bool,
    pub inserted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            name: doc.name,
            description: doc.description,
            category: doc.category,
            uploaded: doc.uploaded,
            inserted_at: doc.inserted_at,
            updated_at: doc.updated_at,
        }
    }
}
