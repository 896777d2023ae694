//! Document upload and download orchestration.

use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use mindoc_core::models::{Document, NewDocument, UploadRequest};
use mindoc_core::AppError;
use mindoc_db::DocumentRepositoryTrait;
use mindoc_storage::{ObjectDownload, ObjectStore, StorageError, UploadCoordinator};
use uuid::Uuid;

use crate::auth::models::Identity;
use crate::services::resolver::PermissionResolver;

/// Orchestrates the two-phase document lifecycle: a pending metadata row,
/// the streamed transfer into object storage, then the uploaded flag flip.
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepositoryTrait>,
    resolver: PermissionResolver,
    store: Arc<dyn ObjectStore>,
    coordinator: UploadCoordinator,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentRepositoryTrait>,
        resolver: PermissionResolver,
        store: Arc<dyn ObjectStore>,
        coordinator: UploadCoordinator,
    ) -> Self {
        Self {
            documents,
            resolver,
            store,
            coordinator,
        }
    }

    /// Ingest one document: reserve (or resume) its metadata row, stream the
    /// file into object storage, then mark the row uploaded.
    ///
    /// A row that already exists with `uploaded = true` is a duplicate and
    /// rejects the request. A pending row from an earlier failed transfer is
    /// reused, keeping its original storage key. A transfer failure leaves
    /// the row pending so the client can retry with the same metadata.
    pub async fn upload_document<S>(
        &self,
        identity: &Identity,
        request: UploadRequest,
        file_stream: S,
        content_type: &str,
    ) -> Result<Document, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + Unpin,
    {
        let object_metadata = request.object_metadata();

        let existing = self
            .documents
            .find_by_natural_key(&request.name, &request.description, &request.category)
            .await?;

        let document = match existing {
            Some(existing) if existing.uploaded => {
                return Err(AppError::DuplicateDocument(format!(
                    "Document '{}' already exists in category '{}'",
                    existing.name, existing.category
                )));
            }
            Some(pending) => {
                tracing::info!(
                    document_id = %pending.id,
                    storage_key = %pending.storage_key,
                    "Resuming a pending document row"
                );
                pending
            }
            None => {
                self.documents
                    .insert_pending(NewDocument {
                        name: request.name,
                        description: request.description,
                        category: request.category,
                        storage_key: request.storage_key,
                        inserted_by: identity.username.clone(),
                    })
                    .await?
            }
        };

        let size_bytes = self
            .coordinator
            .upload(
                file_stream,
                &document.storage_key,
                content_type,
                object_metadata,
            )
            .await?;

        let updated = self
            .documents
            .mark_uploaded(document.id, &identity.username)
            .await?;
        if updated == 0 {
            return Err(AppError::InconsistentState(format!(
                "Document {} vanished before it could be marked uploaded",
                document.id
            )));
        }

        // Re-read so the response carries the updated audit columns.
        let document = self
            .documents
            .find_by_id(document.id)
            .await?
            .ok_or_else(|| {
                AppError::InconsistentState(format!(
                    "Document {} vanished after being marked uploaded",
                    document.id
                ))
            })?;

        tracing::info!(
            document_id = %document.id,
            storage_key = %document.storage_key,
            size_bytes,
            "Document uploaded"
        );

        Ok(document)
    }

    /// Fetch a document's file for an authorized caller.
    ///
    /// Managers and admins bypass the grant lookup; everyone else needs a
    /// direct or group grant. Rows that are missing or still pending read
    /// as not found.
    pub async fn download(
        &self,
        identity: &Identity,
        document_id: Uuid,
    ) -> Result<(Document, ObjectDownload), AppError> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .filter(|document| document.is_available())
            .ok_or_else(|| {
                AppError::DocumentNotFound(format!("Document {} not found", document_id))
            })?;

        if !identity.role.is_elevated() {
            let allowed = self
                .resolver
                .can_download(identity.user_id, document_id)
                .await?;
            if !allowed {
                return Err(AppError::Forbidden(
                    "You do not have permission to download this document".to_string(),
                ));
            }
        }

        let download = self
            .store
            .get_object(&document.storage_key)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => {
                    AppError::NotFound("Document file not found in storage".to_string())
                }
                other => AppError::Storage(other.to_string()),
            })?;

        Ok((document, download))
    }

    /// Document metadata by id.
    pub async fn get(&self, document_id: Uuid) -> Result<Document, AppError> {
        self.documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| {
                AppError::DocumentNotFound(format!("Document {} not found", document_id))
            })
    }

    /// All document metadata, newest first. Pending rows are included with
    /// their uploaded flag exposed.
    pub async fn list(&self) -> Result<Vec<Document>, AppError> {
        self.documents.list().await
    }
}
