//! Storage setup and initialization

use anyhow::{Context, Result};
use mindoc_core::Config;
use mindoc_storage::{create_object_store, ObjectStore};
use std::sync::Arc;

/// Setup the object store backend
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    tracing::info!("Initializing object storage...");
    let store = create_object_store(config)
        .await
        .context("Failed to initialize object storage backend")?;
    tracing::info!(
        backend = ?store.backend_type(),
        "Object storage initialized successfully"
    );
    Ok(store)
}
