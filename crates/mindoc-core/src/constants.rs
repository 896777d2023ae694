//! Shared constants.

/// Versioned API path prefix. All routes except health are mounted under it.
pub const API_PREFIX: &str = "/api/v1";

/// RFC 2046 upper bound on a multipart boundary token, in bytes.
pub const MULTIPART_BOUNDARY_LENGTH_LIMIT: usize = 70;

/// Default part-size threshold for multipart uploads to the object store.
/// 5 MiB is the minimum part size S3-compatible stores accept for
/// non-final parts.
pub const DEFAULT_PART_SIZE_BYTES: usize = 5 * 1024 * 1024;
