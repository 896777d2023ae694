//! Transient-error retry wrapper for store operations.
//!
//! PostgreSQL connections drop, pools time out, and failovers surface as
//! SQLSTATE class 08 or serialization failures. Every repository call runs
//! through `with_retry`, which retries a small fixed number of times with a
//! fixed delay and classifies errors strictly: only driver-transient
//! failures are retried, everything else surfaces immediately.

use mindoc_core::AppError;
use std::future::Future;
use std::time::Duration;

/// Retries after the initial attempt (three attempts total).
const MAX_RETRIES: u32 = 2;

/// Fixed delay between attempts.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Run `operation` with retries on transient database errors.
///
/// `operation_key` names the logical store operation (e.g.
/// `"documents.insert_pending"`) and is carried into the retry warnings and
/// the terminal `TransientStore` error. The closure is re-invoked for each
/// attempt, so it must be cheap to rebuild.
pub async fn with_retry<T, F, Fut>(operation_key: &str, mut operation: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) => {
                if attempt < MAX_RETRIES {
                    attempt += 1;
                    tracing::warn!(
                        operation = %operation_key,
                        attempt,
                        max_retries = MAX_RETRIES,
                        error = %err,
                        "Transient database error, retrying"
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                } else {
                    return Err(AppError::TransientStore {
                        operation: operation_key.to_string(),
                        source: err,
                    });
                }
            }
            Err(err) => return Err(AppError::Database(err)),
        }
    }
}

/// Whether a database error is worth retrying.
///
/// Covers driver-level connection failures plus the SQLSTATE codes Postgres
/// uses for connection exceptions (class 08), serialization failures
/// (40001), deadlocks (40P01), too-many-connections (53300) and
/// cannot-connect-now (57P03). Constraint violations and query errors are
/// never retried.
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => {
                code.starts_with("08")
                    || code == "40001"
                    || code == "40P01"
                    || code == "53300"
                    || code == "57P03"
            }
            None => false,
        },
        _ => false,
    }
}

/// Whether the error is a unique-constraint violation.
pub fn is_unique_violation(err: &AppError) -> bool {
    match err {
        AppError::Database(db_err) => db_err
            .as_database_error()
            .map(|e| matches!(e.kind(), sqlx::error::ErrorKind::UniqueViolation))
            .unwrap_or(false),
        _ => false,
    }
}

/// Whether the error is a foreign-key violation.
pub fn is_foreign_key_violation(err: &AppError) -> bool {
    match err {
        AppError::Database(db_err) => db_err
            .as_database_error()
            .map(|e| matches!(e.kind(), sqlx::error::ErrorKind::ForeignKeyViolation))
            .unwrap_or(false),
        _ => false,
    }
}
