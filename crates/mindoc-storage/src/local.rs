//! Local filesystem object storage backend.
//!
//! Multipart sessions stage their parts under `.multipart/{session_id}/`
//! inside the base directory. Completing a session concatenates the staged
//! parts into the final object file and records the content type in a
//! sidecar; aborting removes the staging directory. Intended for local
//! development and tests.

use crate::traits::{
    MultipartSession, ObjectDownload, ObjectStore, PartToken, StorageError, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use mindoc_core::config::StorageBackend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

const STAGING_DIR: &str = ".multipart";
const CONTENT_TYPE_FILE: &str = "content-type";

/// Local filesystem object storage implementation
#[derive(Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    /// Create a new LocalObjectStore rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalObjectStore { base_path })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that would
    /// escape the base directory or collide with the staging area.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "storage key contains invalid characters".to_string(),
            ));
        }
        if key == STAGING_DIR || key.starts_with(&format!("{}/", STAGING_DIR)) {
            return Err(StorageError::InvalidKey(
                "storage key collides with the staging area".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    fn staging_dir(&self, session_id: &str) -> StorageResult<PathBuf> {
        // Session ids are uuids handed out by initiate_multipart_upload.
        Uuid::parse_str(session_id).map_err(|_| {
            StorageError::InvalidKey(format!("invalid session id: {}", session_id))
        })?;
        Ok(self.base_path.join(STAGING_DIR).join(session_id))
    }

    fn part_file(staging: &Path, part_number: i32) -> PathBuf {
        staging.join(format!("part-{:05}", part_number))
    }

    fn content_type_sidecar(path: &Path) -> PathBuf {
        let mut sidecar = path.as_os_str().to_os_string();
        sidecar.push(".content-type");
        PathBuf::from(sidecar)
    }

    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn initiate_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
        _metadata: HashMap<String, String>,
    ) -> StorageResult<MultipartSession> {
        // Validate the final key up front so a bad key fails before any
        // bytes move.
        self.key_to_path(key)?;

        let session_id = Uuid::new_v4().to_string();
        let staging = self.staging_dir(&session_id)?;
        fs::create_dir_all(&staging).await?;
        fs::write(staging.join(CONTENT_TYPE_FILE), content_type.as_bytes()).await?;

        tracing::debug!(key = %key, session_id = %session_id, "Opened local multipart session");

        Ok(MultipartSession {
            session_id,
            key: key.to_string(),
        })
    }

    async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: i32,
        data: Bytes,
        _is_last: bool,
    ) -> StorageResult<PartToken> {
        if part_number < 1 {
            return Err(StorageError::UploadFailed(format!(
                "invalid part number {}",
                part_number
            )));
        }

        let staging = self.staging_dir(&session.session_id)?;
        let size_bytes = data.len();
        fs::write(Self::part_file(&staging, part_number), &data)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("failed to stage part {}: {}", part_number, e))
            })?;

        tracing::trace!(
            key = %session.key,
            part_number,
            size_bytes,
            "Staged local part"
        );

        Ok(PartToken {
            part_number,
            etag: format!("{:05}-{}", part_number, size_bytes),
        })
    }

    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: Vec<PartToken>,
    ) -> StorageResult<()> {
        let staging = self.staging_dir(&session.session_id)?;
        let final_path = self.key_to_path(&session.key)?;
        Self::ensure_parent_dir(&final_path).await?;

        let mut ordered = parts;
        ordered.sort_by_key(|part| part.part_number);

        let mut output = fs::File::create(&final_path).await?;
        for part in &ordered {
            let data = fs::read(Self::part_file(&staging, part.part_number))
                .await
                .map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "missing staged part {}: {}",
                        part.part_number, e
                    ))
                })?;
            output.write_all(&data).await?;
        }
        output.flush().await?;

        if let Ok(content_type) = fs::read_to_string(staging.join(CONTENT_TYPE_FILE)).await {
            fs::write(
                Self::content_type_sidecar(&final_path),
                content_type.as_bytes(),
            )
            .await?;
        }

        fs::remove_dir_all(&staging).await?;

        tracing::info!(
            key = %session.key,
            parts = ordered.len(),
            "Completed local multipart upload"
        );

        Ok(())
    }

    async fn abort_multipart_upload(&self, session: &MultipartSession) -> StorageResult<()> {
        let staging = self.staging_dir(&session.session_id)?;
        match fs::remove_dir_all(&staging).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::IoError(e)),
        }

        tracing::warn!(
            key = %session.key,
            session_id = %session.session_id,
            "Aborted local multipart session"
        );

        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<ObjectDownload> {
        let path = self.key_to_path(key)?;
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let content_length = file.metadata().await.ok().map(|meta| meta.len());
        let content_type = fs::read_to_string(Self::content_type_sidecar(&path))
            .await
            .ok();

        let stream = ReaderStream::new(file)
            .map(|chunk| chunk.map_err(StorageError::IoError))
            .boxed();

        Ok(ObjectDownload {
            stream,
            content_type,
            content_length,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
