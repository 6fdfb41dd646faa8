pub mod config;
pub mod error;

pub use config::{
    expand_forecast_url, Config, EndpointsConfig, UiConfig, ValidationResult,
    OFFICE_CODE_PLACEHOLDER,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Log to stderr; stdout belongs to the terminal display
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("JMA weather core initialized");
    Ok(())
}
