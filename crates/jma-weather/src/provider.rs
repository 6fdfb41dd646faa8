//! HTTP access to the JMA area and forecast feeds.

use std::sync::Arc;
use std::time::Duration;

use jma_core::{expand_forecast_url, EndpointsConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::forecast::render_forecast;
use crate::region::build_region_index;
use crate::types::{AreaDocument, Forecast, ForecastEdition, RegionIndex, WeatherError};

const USER_AGENT: &str = concat!("jma-weather/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct JmaProvider {
    client: Arc<Client>,
    area_url: String,
    forecast_url_template: String,
}

impl JmaProvider {
    /// Create a provider for the given endpoints.
    /// `forecast_url_template` must contain `{code}`, replaced by the office code.
    pub fn new(
        area_url: impl Into<String>,
        forecast_url_template: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            area_url: area_url.into(),
            forecast_url_template: forecast_url_template.into(),
        })
    }

    /// Create a provider from the configured endpoints
    pub fn from_endpoints(endpoints: &EndpointsConfig) -> Result<Self, WeatherError> {
        Self::new(
            endpoints.area_url.clone(),
            endpoints.forecast_url_template.clone(),
            Duration::from_secs(endpoints.request_timeout_secs),
        )
    }

    pub fn forecast_url(&self, office_code: &str) -> String {
        expand_forecast_url(&self.forecast_url_template, office_code)
    }

    /// Fetch the area definition document
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_area(&self) -> Result<AreaDocument, WeatherError> {
        self.get_json(&self.area_url).await
    }

    /// Fetch all forecast editions for an office.
    /// The code is not checked against the region index; unknown codes fail here.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(
        &self,
        office_code: &str,
    ) -> Result<Vec<ForecastEdition>, WeatherError> {
        let url = self.forecast_url(office_code);
        self.get_json(&url).await
    }

    /// Fetch the area document and build the navigation index
    pub async fn region_index(&self) -> Result<RegionIndex, WeatherError> {
        let doc = self.fetch_area().await?;
        Ok(build_region_index(&doc))
    }

    /// Fetch and render the forecast for an office
    pub async fn forecast(&self, office_code: &str) -> Result<Forecast, WeatherError> {
        let editions = self.fetch_forecast(office_code).await?;
        render_forecast(office_code, &editions)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GET {} returned status {}", url, status);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!("Failed to parse response from {}: {}", url, e);
            WeatherError::Parse(e.to_string())
        })
    }
}
