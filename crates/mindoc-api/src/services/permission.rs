//! Grant administration for document downloads.

use std::sync::Arc;

use mindoc_core::models::{Document, DocumentPermission, PermissionSubject};
use mindoc_core::AppError;
use mindoc_db::{DocumentRepositoryTrait, PermissionRepositoryTrait};
use uuid::Uuid;

use crate::auth::models::Identity;

/// Grants and revokes download permissions on uploaded documents.
#[derive(Clone)]
pub struct PermissionService {
    documents: Arc<dyn DocumentRepositoryTrait>,
    permissions: Arc<dyn PermissionRepositoryTrait>,
}

impl PermissionService {
    pub fn new(
        documents: Arc<dyn DocumentRepositoryTrait>,
        permissions: Arc<dyn PermissionRepositoryTrait>,
    ) -> Self {
        Self {
            documents,
            permissions,
        }
    }

    /// Grant `subject` download access to a document. The document must
    /// exist and be fully uploaded; a grant that already exists is a
    /// conflict.
    pub async fn grant(
        &self,
        identity: &Identity,
        document_id: Uuid,
        subject: PermissionSubject,
    ) -> Result<DocumentPermission, AppError> {
        self.require_available(document_id).await?;
        let permission = self
            .permissions
            .grant(document_id, &subject, &identity.username)
            .await?;
        tracing::info!(
            document_id = %document_id,
            subject = %subject,
            granted_by = %identity.username,
            "Permission granted"
        );
        Ok(permission)
    }

    /// Remove a grant. Returns false when no matching grant existed.
    pub async fn revoke(
        &self,
        document_id: Uuid,
        subject: PermissionSubject,
    ) -> Result<bool, AppError> {
        self.require_available(document_id).await?;
        let removed = self.permissions.revoke(document_id, &subject).await?;
        if removed {
            tracing::info!(document_id = %document_id, subject = %subject, "Permission revoked");
        }
        Ok(removed)
    }

    /// Pending rows cannot carry grants; they read as not found.
    async fn require_available(&self, document_id: Uuid) -> Result<Document, AppError> {
        self.documents
            .find_by_id(document_id)
            .await?
            .filter(|document| document.is_available())
            .ok_or_else(|| {
                AppError::DocumentNotFound(format!("Document {} not found", document_id))
            })
    }
}
