//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use mindoc_core::config::StorageBackend;
use mindoc_core::Config;

/// S3 rejects every multipart part below this size except the last one.
const S3_MIN_PART_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Validate critical configuration values
///
/// Checks that critical configuration is set correctly and fails fast on
/// values that would cause security problems or runtime errors later.
pub fn validate_config(config: &Config) -> Result<()> {
    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if is_production && config.cors_origins().contains(&"*".to_string()) {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.jwt_secret().is_empty() {
        return Err(anyhow::anyhow!(
            "JWT secret cannot be empty - set JWT_SECRET environment variable"
        ));
    }

    if is_production && config.jwt_secret().len() < 32 {
        tracing::warn!(
            "JWT secret is shorter than 32 characters - consider using a longer, more secure secret"
        );
    }

    if config.jwt_expiry_hours() <= 0 {
        return Err(anyhow::anyhow!("JWT expiry must be at least one hour"));
    }

    if config.allowed_content_types().is_empty() {
        return Err(anyhow::anyhow!(
            "Allowed content type list cannot be empty - set ALLOWED_CONTENT_TYPES environment variable"
        ));
    }

    if config.max_upload_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Max upload size cannot be 0"));
    }

    if config.part_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Upload part size cannot be 0"));
    }

    if config.storage_backend() == StorageBackend::S3
        && config.part_size_bytes() < S3_MIN_PART_SIZE_BYTES
    {
        return Err(anyhow::anyhow!(
            "Upload part size {} is below the S3 multipart minimum of {} bytes",
            config.part_size_bytes(),
            S3_MIN_PART_SIZE_BYTES
        ));
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
