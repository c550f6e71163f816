pub mod config;
pub mod error;

pub use config::{
    Config, FavoritesConfig, GeocodingConfig, PipelineConfig, ProviderConfig, Units, ViewConfig,
};
pub use error::{
    AppError, AssemblyError, ConfigError, DatabaseError, PersistenceConflictError,
    ReqwestErrorExt, RusqliteErrorExt, UpstreamError, ValidationError,
};

use anyhow::Result;

/// Initialize logging for Skycast.
///
/// Reads `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Skycast core initialized");
    }
    Ok(())
}
