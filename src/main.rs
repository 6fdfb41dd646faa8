use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use jma_core::{AppError, Config};
use jma_ui::{bridge, AppState, ForecastService, Shell};
use jma_weather::JmaProvider;

fn main() -> Result<()> {
    // Initialize core
    jma_core::init()?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            let err = AppError::classify(e);
            anyhow::bail!("{} ({})", err.user_message(), err);
        }
    };

    let endpoints = &config.endpoints;
    tracing::info!(
        area_url = %endpoints.area_url,
        forecast_url = %endpoints.forecast_url_template,
        timeout_secs = endpoints.request_timeout_secs,
        "Starting JMA weather"
    );

    let runtime = bridge::get_or_init_runtime()?;
    let provider = Arc::new(JmaProvider::from_endpoints(endpoints)?);

    // Without the area document there is no navigation to show
    let index = runtime
        .block_on(provider.region_index())
        .context("Failed to load the JMA area document")?;

    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(tx, Some(runtime), provider);
    let mut shell = Shell::new(
        AppState::new(index),
        service,
        rx,
        config.ui.clone(),
        std::io::stdout(),
    );

    shell.start()?;
    shell.run(std::io::BufReader::new(std::io::stdin()))?;

    tracing::info!("Shutting down");
    Ok(())
}
