//! Object storage abstraction
//!
//! This module defines the ObjectStore trait that all storage backends must
//! implement. The trait exposes the chunked multipart upload protocol plus a
//! streaming download, so the upload coordinator and the document service can
//! work with any backend without coupling to implementation details.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use mindoc_core::config::StorageBackend;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streaming object body
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Handle for one in-flight multipart upload session.
///
/// Created by `initiate_multipart_upload` and threaded through every
/// subsequent part, complete, and abort call for that upload.
#[derive(Debug, Clone)]
pub struct MultipartSession {
    /// Backend-assigned session identifier (the S3 upload id, or a staging
    /// directory name for the local backend)
    pub session_id: String,
    /// Storage key the finished object will live under
    pub key: String,
}

/// Receipt for one uploaded part, to be handed back on completion.
///
/// Parts are numbered starting from 1 and must be completed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartToken {
    pub part_number: i32,
    pub etag: String,
}

/// A downloaded object: its body as a byte stream plus the content metadata
/// recorded when the object was uploaded.
pub struct ObjectDownload {
    pub stream: ByteStream,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Object storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
///
/// An upload is a session: `initiate_multipart_upload` opens it, one or more
/// `upload_part` calls ship numbered chunks, and exactly one of
/// `complete_multipart_upload` or `abort_multipart_upload` closes it. A session
/// that is never completed must be aborted so the backend can release any
/// staged parts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open a multipart upload session for `key`.
    ///
    /// `content_type` and `metadata` are recorded with the session and stored
    /// on the finished object, where they are returned by `get_object`.
    async fn initiate_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<MultipartSession>;

    /// Upload one numbered part of an open session.
    ///
    /// `part_number` starts at 1 and increases by one per part. `is_last`
    /// marks the final part of the session; backends that infer completion
    /// from `complete_multipart_upload` alone may ignore it.
    async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: i32,
        data: Bytes,
        is_last: bool,
    ) -> StorageResult<PartToken>;

    /// Assemble the uploaded parts into the finished object.
    ///
    /// `parts` must contain the token of every shipped part in part-number
    /// order. After this call the session is closed.
    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: Vec<PartToken>,
    ) -> StorageResult<()>;

    /// Abandon an open session and release its staged parts.
    async fn abort_multipart_upload(&self, session: &MultipartSession) -> StorageResult<()>;

    /// Download an object by its storage key.
    ///
    /// Returns `StorageError::NotFound` when no object exists at `key`.
    async fn get_object(&self, key: &str) -> StorageResult<ObjectDownload>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
