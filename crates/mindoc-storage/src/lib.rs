//! Mindoc Storage Library
//!
//! This crate provides the object storage abstraction and implementations for Mindoc.
//! It includes the ObjectStore trait (a chunked multipart upload protocol plus
//! streaming download), the UploadCoordinator that drives a byte stream through
//! that protocol with pooled buffers, and backends for S3 and the local filesystem.
//!
//! # Storage key format
//!
//! Storage keys are derived from the upload timestamp and the document name
//! (`{yyyyMMddHHmmssSSS}{name}`) by `mindoc_core::models::derive_storage_key`.
//! Keys must not contain `..` or a leading `/`.

pub mod buffer;
pub mod coordinator;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use buffer::{BufferPool, PooledBuffer};
pub use coordinator::UploadCoordinator;
pub use factory::create_object_store;
#[cfg(feature = "storage-local")]
pub use local::LocalObjectStore;
pub use mindoc_core::config::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStore;
pub use traits::{
    ByteStream, MultipartSession, ObjectDownload, ObjectStore, PartToken, StorageError,
    StorageResult,
};
