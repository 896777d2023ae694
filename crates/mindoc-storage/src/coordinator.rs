//! Multipart upload coordinator.
//!
//! Drives a byte stream through the ObjectStore multipart protocol: bytes
//! accumulate in a pooled part-sized buffer, full buffers ship as numbered
//! parts, and whatever remains when the stream ends ships as the explicitly
//! marked last part. Every upload therefore produces at least one part,
//! zero-length input included, and exactly `ceil(size / part_size)` parts
//! otherwise. On any failure the in-flight session is aborted exactly once
//! before the error surfaces; when the upload future is dropped mid-flight
//! the abort is spawned onto the runtime instead.

use crate::buffer::BufferPool;
use crate::traits::{MultipartSession, ObjectStore, PartToken};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use mindoc_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;

/// Coordinates chunked uploads against an object store.
#[derive(Clone)]
pub struct UploadCoordinator {
    store: Arc<dyn ObjectStore>,
    pool: Arc<BufferPool>,
}

impl UploadCoordinator {
    /// Create a coordinator shipping parts of `part_size` bytes.
    pub fn new(store: Arc<dyn ObjectStore>, part_size: usize) -> Self {
        UploadCoordinator {
            store,
            pool: BufferPool::new(part_size),
        }
    }

    /// Part size in bytes.
    pub fn part_size(&self) -> usize {
        self.pool.capacity()
    }

    /// Stream `body` into the object store under `key`.
    ///
    /// Returns the total number of bytes uploaded. Errors from the input
    /// stream are passed through unchanged; store errors surface as
    /// `AppError::UploadFailed`. Either way the session has been aborted by
    /// the time the error is returned.
    pub async fn upload<S>(
        &self,
        body: S,
        key: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + Unpin,
    {
        let session = self
            .store
            .initiate_multipart_upload(key, content_type, metadata)
            .await
            .map_err(|e| AppError::UploadFailed(format!("failed to initiate upload: {}", e)))?;

        tracing::debug!(
            key = %key,
            session_id = %session.session_id,
            part_size = self.pool.capacity(),
            "Opened multipart upload session"
        );

        let mut guard = AbortGuard::new(Arc::clone(&self.store), session.clone());

        match self.run_session(&session, body).await {
            Ok(total_bytes) => {
                guard.disarm();
                tracing::debug!(
                    key = %key,
                    session_id = %session.session_id,
                    size_bytes = total_bytes,
                    "Completed multipart upload session"
                );
                Ok(total_bytes)
            }
            Err(err) => {
                guard.disarm();
                if let Err(abort_err) = self.store.abort_multipart_upload(&session).await {
                    tracing::error!(
                        key = %key,
                        session_id = %session.session_id,
                        error = %abort_err,
                        "Failed to abort multipart upload session"
                    );
                }
                Err(err)
            }
        }
    }

    async fn run_session<S>(
        &self,
        session: &MultipartSession,
        mut body: S,
    ) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + Unpin,
    {
        let part_size = self.pool.capacity();
        let mut buffer = self.pool.checkout();
        let mut parts: Vec<PartToken> = Vec::new();
        let mut part_number: i32 = 1;
        let mut total_bytes: u64 = 0;

        while let Some(chunk) = body.next().await {
            let mut chunk = chunk?;
            total_bytes += chunk.len() as u64;

            while !chunk.is_empty() {
                // Ship a full buffer only once another byte is waiting, so
                // the final part is always the one marked last.
                if buffer.len() == part_size {
                    let data = Bytes::copy_from_slice(&buffer[..]);
                    buffer.clear();
                    let token = self.ship_part(session, part_number, data, false).await?;
                    parts.push(token);
                    part_number += 1;
                }

                let take = usize::min(part_size - buffer.len(), chunk.len());
                buffer.extend_from_slice(&chunk.split_to(take));
            }
        }

        // The remainder ships as the explicitly-last part even when empty,
        // so a session always carries at least one part.
        let data = Bytes::copy_from_slice(&buffer[..]);
        buffer.clear();
        let token = self.ship_part(session, part_number, data, true).await?;
        parts.push(token);

        self.store
            .complete_multipart_upload(session, parts)
            .await
            .map_err(|e| AppError::UploadFailed(format!("failed to complete upload: {}", e)))?;

        Ok(total_bytes)
    }

    async fn ship_part(
        &self,
        session: &MultipartSession,
        part_number: i32,
        data: Bytes,
        is_last: bool,
    ) -> Result<PartToken, AppError> {
        let size_bytes = data.len();
        let token = self
            .store
            .upload_part(session, part_number, data, is_last)
            .await
            .map_err(|e| {
                AppError::UploadFailed(format!("failed to upload part {}: {}", part_number, e))
            })?;

        tracing::trace!(
            session_id = %session.session_id,
            part_number,
            size_bytes,
            is_last,
            "Uploaded part"
        );

        Ok(token)
    }
}

/// Aborts the session from `Drop` when the upload future is cancelled before
/// reaching a completion or failure path.
struct AbortGuard {
    store: Arc<dyn ObjectStore>,
    session: Option<MultipartSession>,
}

impl AbortGuard {
    fn new(store: Arc<dyn ObjectStore>, session: MultipartSession) -> Self {
        AbortGuard {
            store,
            session: Some(session),
        }
    }

    fn disarm(&mut self) {
        self.session = None;
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let store = Arc::clone(&self.store);
                handle.spawn(async move {
                    match store.abort_multipart_upload(&session).await {
                        Ok(()) => tracing::warn!(
                            key = %session.key,
                            session_id = %session.session_id,
                            "Upload cancelled, aborted multipart session"
                        ),
                        Err(err) => tracing::error!(
                            key = %session.key,
                            session_id = %session.session_id,
                            error = %err,
                            "Failed to abort multipart session after cancellation"
                        ),
                    }
                });
            }
        }
    }
}
