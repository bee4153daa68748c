pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, LocationConfig, StorageConfig, ValidationResult};
pub use error::{AppError, ConfigError, DatabaseError, LocationError, RusqliteErrorExt};

use anyhow::Result;

/// Result type returned across the repository boundary.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Initialize logging.
///
/// Honours `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("EnviroSense core initialized");
    Ok(())
}
