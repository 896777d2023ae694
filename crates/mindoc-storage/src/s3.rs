//! AWS S3 object storage backend.
//!
//! Maps the ObjectStore multipart protocol directly onto the S3 multipart
//! upload API. Content type and document metadata are recorded on the
//! session at creation and land on the finished object.

use crate::traits::{
    MultipartSession, ObjectDownload, ObjectStore, PartToken, StorageError, StorageResult,
};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::StreamExt;
use mindoc_core::config::StorageBackend;
use std::collections::HashMap;
use tokio_util::io::ReaderStream;

/// S3 object storage implementation
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store.
    ///
    /// `endpoint_url` points the client at an S3-compatible service such as
    /// MinIO; those usually require `force_path_style` as well.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> StorageResult<Self> {
        let region_provider = RegionProviderChain::first_try(Region::new(region));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        // S3-compatible providers need a custom endpoint and usually
        // path-style addressing as well
        let client = if let Some(endpoint) = endpoint_url {
            let s3_config = aws_sdk_s3::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .force_path_style(force_path_style)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&config)
        };

        Ok(S3ObjectStore { client, bucket })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn initiate_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<MultipartSession> {
        let response = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .set_metadata(Some(metadata))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("create_multipart_upload: {}", e)))?;

        let upload_id = response.upload_id().ok_or_else(|| {
            StorageError::UploadFailed("S3 did not return an upload id".to_string())
        })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            upload_id = %upload_id,
            "Created S3 multipart upload"
        );

        Ok(MultipartSession {
            session_id: upload_id.to_string(),
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
        let size_bytes = data.len();
        let response = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(&session.key)
            .upload_id(&session.session_id)
            .part_number(part_number)
            .body(AwsByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("upload_part {}: {}", part_number, e))
            })?;

        let etag = response.e_tag().ok_or_else(|| {
            StorageError::UploadFailed(format!(
                "S3 did not return an etag for part {}",
                part_number
            ))
        })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %session.key,
            part_number,
            size_bytes,
            "Uploaded part to S3"
        );

        Ok(PartToken {
            part_number,
            etag: etag.to_string(),
        })
    }

    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: Vec<PartToken>,
    ) -> StorageResult<()> {
        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|part| {
                CompletedPart::builder()
                    .part_number(part.part_number)
                    .e_tag(&part.etag)
                    .build()
            })
            .collect();

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(&session.key)
            .upload_id(&session.session_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("complete_multipart_upload: {}", e))
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %session.key,
            parts = parts.len(),
            "Completed S3 multipart upload"
        );

        Ok(())
    }

    async fn abort_multipart_upload(&self, session: &MultipartSession) -> StorageResult<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(&session.key)
            .upload_id(&session.session_id)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("abort_multipart_upload: {}", e)))?;

        tracing::warn!(
            bucket = %self.bucket,
            key = %session.key,
            upload_id = %session.session_id,
            "Aborted S3 multipart upload"
        );

        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<ObjectDownload> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
                {
                    StorageError::NotFound(key.to_string())
                }
                _ => StorageError::DownloadFailed(format!("get_object: {}", e)),
            })?;

        let content_type = response.content_type().map(String::from);
        let content_length = response
            .content_length()
            .and_then(|len| u64::try_from(len).ok());

        let stream = ReaderStream::new(response.body.into_async_read())
            .map(|chunk| chunk.map_err(StorageError::IoError))
            .boxed();

        Ok(ObjectDownload {
            stream,
            content_type,
            content_length,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
