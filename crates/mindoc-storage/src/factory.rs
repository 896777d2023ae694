//! Storage backend factory.

#[cfg(feature = "storage-local")]
use crate::LocalObjectStore;
#[cfg(feature = "storage-s3")]
use crate::S3ObjectStore;
use crate::{ObjectStore, StorageError, StorageResult};
use mindoc_core::config::StorageBackend;
use mindoc_core::Config;
use std::sync::Arc;

/// Create an object store backend based on configuration
pub async fn create_object_store(config: &Config) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config.s3_bucket();
            if bucket.is_empty() {
                return Err(StorageError::ConfigError(
                    "S3_BUCKET not configured".to_string(),
                ));
            }

            let store = S3ObjectStore::new(
                bucket.to_string(),
                config.s3_region().to_string(),
                config.s3_endpoint().map(String::from),
                config.s3_force_path_style(),
            )
            .await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let store = LocalObjectStore::new(config.local_storage_path()).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
