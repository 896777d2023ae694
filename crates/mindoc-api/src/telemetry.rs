//! Tracing subscriber initialization.

use anyhow::Result;
use mindoc_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing. Production gets JSON lines for log shippers,
/// everything else gets the human-readable format.
///
/// The `RUST_LOG` environment variable overrides the default filter.
pub fn init_telemetry(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mindoc=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;
    }

    Ok(())
}
