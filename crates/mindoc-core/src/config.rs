//! Environment-driven application configuration.
//!
//! All settings come from environment variables (a `.env` file is honored in
//! development). `Config::from_env()` fails fast on missing required values;
//! everything else carries a default suitable for local development.

use std::env;

use crate::constants::DEFAULT_PART_SIZE_BYTES;

/// Which object-store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => Err(anyhow::anyhow!(
                "Unknown storage backend '{}', expected 's3' or 'local'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    server_port: u16,
    environment: String,
    cors_origins: Vec<String>,

    database_url: String,
    db_max_connections: u32,
    db_timeout_seconds: u64,

    jwt_secret: String,
    jwt_expiry_hours: i64,

    storage_backend: StorageBackend,
    s3_bucket: String,
    s3_region: String,
    s3_endpoint: Option<String>,
    s3_force_path_style: bool,
    local_storage_path: String,

    allowed_content_types: Vec<String>,
    part_size_bytes: usize,
    max_upload_size_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const SERVER_PORT: u16 = 4000;
        const MAX_CONNECTIONS: u32 = 10;
        const CONNECTION_TIMEOUT_SECS: u64 = 30;
        const JWT_EXPIRY_HOURS: i64 = 24;
        const MAX_UPLOAD_SIZE_MB: usize = 1024;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let s3_bucket = env::var("S3_BUCKET").unwrap_or_default();
        if storage_backend == StorageBackend::S3 && s3_bucket.is_empty() {
            return Err(anyhow::anyhow!(
                "S3_BUCKET must be set when STORAGE_BACKEND is 's3'"
            ));
        }

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "application/pdf,text/plain,text/csv".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            storage_backend,
            s3_bucket,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            s3_force_path_style: env::var("S3_FORCE_PATH_STYLE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/storage".to_string()),
            allowed_content_types,
            part_size_bytes: env::var("PART_SIZE_BYTES")
                .unwrap_or_else(|_| DEFAULT_PART_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_PART_SIZE_BYTES),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
        })
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.jwt_expiry_hours
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn s3_bucket(&self) -> &str {
        &self.s3_bucket
    }

    pub fn s3_region(&self) -> &str {
        &self.s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn s3_force_path_style(&self) -> bool {
        self.s3_force_path_style
    }

    pub fn local_storage_path(&self) -> &str {
        &self.local_storage_path
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    pub fn part_size_bytes(&self) -> usize {
        self.part_size_bytes
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }

    /// Construct a config directly, bypassing the environment. Intended for
    /// tests; production code goes through `from_env`.
    pub fn for_tests(
        database_url: String,
        jwt_secret: String,
        allowed_content_types: Vec<String>,
        part_size_bytes: usize,
    ) -> Self {
        Config {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            database_url,
            db_max_connections: 2,
            db_timeout_seconds: 5,
            jwt_secret,
            jwt_expiry_hours: 1,
            storage_backend: StorageBackend::Local,
            s3_bucket: String::new(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_force_path_style: false,
            local_storage_path: "./data/storage".to_string(),
            allowed_content_types,
            part_size_bytes,
            max_upload_size_bytes: 64 * 1024 * 1024,
        }
    }
}
