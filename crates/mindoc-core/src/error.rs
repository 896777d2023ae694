//! Error types module
//!
//! This module provides the core error types used throughout the mindoc
//! application. All errors are unified under the `AppError` enum which can
//! represent ingestion, storage, database, and permission errors.
//!
//! The `Database`/`TransientStore` variants and `From<sqlx::Error>` are gated
//! behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like exhausted retries
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DUPLICATE_DOCUMENT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// A driver-transient database failure that persisted through every
    /// retry attempt.
    #[cfg(feature = "sqlx")]
    #[error("Transient database error during {operation}: {source}")]
    TransientStore {
        operation: String,
        #[source]
        source: SqlxError,
    },

    #[cfg(not(feature = "sqlx"))]
    #[error("Transient database error during {operation}")]
    TransientStore { operation: String },

    #[error("Storage error: {0}")]
    Storage(String),

    /// Request body or headers could not be understood (bad multipart
    /// boundary, missing sections, missing required fields).
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Declared content type is not allowed or contradicts the filename
    /// extension. Raised before any byte reaches the object store.
    #[error("Unauthorized content type: {0}")]
    UnauthorizedContentType(String),

    /// A document with the same (name, description, category) already
    /// exists and is fully uploaded.
    #[error("Duplicate document: {0}")]
    DuplicateDocument(String),

    /// The referenced document is missing, or exists but was never fully
    /// uploaded and is therefore invisible to callers.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The multipart session against the object store could not complete.
    /// Always preceded by a best-effort abort of the session.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Bytes are durably in the object store but the metadata row refused
    /// the uploaded-flag update. Reported, never swallowed.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

// Error conversion implementations
#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::TransientStore { .. } => (
            503,
            "TRANSIENT_STORE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Warn,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::MalformedRequest(_) => (
            400,
            "MALFORMED_REQUEST",
            false,
            Some("Check request format and multipart fields"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnauthorizedContentType(_) => (
            415,
            "UNAUTHORIZED_CONTENT_TYPE",
            false,
            Some("Upload a file whose type is in the configured allow-list"),
            false,
            LogLevel::Debug,
        ),
        AppError::DuplicateDocument(_) => (
            409,
            "DUPLICATE_DOCUMENT",
            false,
            Some("Change name, description or category"),
            false,
            LogLevel::Debug,
        ),
        AppError::DocumentNotFound(_) => (
            404,
            "DOCUMENT_NOT_FOUND",
            false,
            Some("Verify the document ID exists and has finished uploading"),
            false,
            LogLevel::Debug,
        ),
        AppError::UploadFailed(_) => (
            500,
            "UPLOAD_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::InconsistentState(_) => (
            500,
            "INCONSISTENT_STATE",
            false,
            Some("Contact the operator; the stored object and its record disagree"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Use a different unique value"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check credentials or authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Request access from a document manager"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::TransientStore { .. } => "TransientStore",
            AppError::Storage(_) => "Storage",
            AppError::MalformedRequest(_) => "MalformedRequest",
            AppError::UnauthorizedContentType(_) => "UnauthorizedContentType",
            AppError::DuplicateDocument(_) => "DuplicateDocument",
            AppError::DocumentNotFound(_) => "DocumentNotFound",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::InconsistentState(_) => "InconsistentState",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        // Add source error chain
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::TransientStore { .. } => {
                "Temporary database problem, please retry".to_string()
            }
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::MalformedRequest(ref msg) => msg.clone(),
            AppError::UnauthorizedContentType(ref msg) => msg.clone(),
            AppError::DuplicateDocument(ref msg) => msg.clone(),
            AppError::DocumentNotFound(ref msg) => msg.clone(),
            AppError::UploadFailed(_) => "Failed to store the uploaded file".to_string(),
            AppError::InconsistentState(_) => {
                "The upload finished but its record could not be confirmed".to_string()
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_duplicate_document() {
        let err = AppError::DuplicateDocument("report already exists".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_DOCUMENT");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "report already exists");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_document_not_found() {
        let err = AppError::DocumentNotFound("no such document".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "DOCUMENT_NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_unauthorized_content_type() {
        let err = AppError::UnauthorizedContentType("image/png not allowed".to_string());
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(err.error_code(), "UNAUTHORIZED_CONTENT_TYPE");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_upload_failed_is_sensitive() {
        let err = AppError::UploadFailed("part 3 rejected".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Failed to store the uploaded file");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_inconsistent_state() {
        let err = AppError::InconsistentState("uploaded flag not set".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "INCONSISTENT_STATE");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_error_metadata_transient_store() {
        let err = AppError::TransientStore {
            operation: "DocumentRepository::insert".to_string(),
            source: sqlx::Error::PoolTimedOut,
        };
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "TRANSIENT_STORE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(err.to_string().contains("DocumentRepository::insert"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err1 = AppError::DocumentNotFound("test".to_string());
        assert_eq!(
            err1.suggested_action(),
            Some("Verify the document ID exists and has finished uploading")
        );

        let err2 = AppError::InvalidInput("test".to_string());
        assert_eq!(
            err2.suggested_action(),
            Some("Check request parameters and try again")
        );
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let io_err = std::io::Error::other("connection reset");
        let err = AppError::InternalWithSource {
            message: "storage call failed".to_string(),
            source: anyhow::Error::from(io_err),
        };
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("connection reset"));
    }
}
