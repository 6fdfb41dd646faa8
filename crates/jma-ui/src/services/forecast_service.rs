//! Forecast backend: async forecast fetching.
//! Network work runs on the tokio runtime, off the interactive thread;
//! results are sent back via mpsc. A newer selection cancels the fetch
//! still in flight for an older one.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use jma_core::{NetworkError, ReqwestErrorExt};
use jma_weather::{Forecast, JmaProvider, WeatherError};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Error type for forecast operations
#[derive(Debug, Clone)]
pub enum ForecastError {
    Network(String),
    Timeout,
    Server(u16),
    NotFound(String),
    Document(String),
    NotInitialized,
}

impl std::fmt::Display for ForecastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastError::Network(s) => write!(f, "Forecast error: {}", s),
            ForecastError::Timeout => write!(f, "Forecast request timed out"),
            ForecastError::Server(status) => write!(f, "Forecast server returned {}", status),
            ForecastError::NotFound(s) => write!(f, "No forecast for office {}", s),
            ForecastError::Document(s) => write!(f, "Malformed forecast: {}", s),
            ForecastError::NotInitialized => write!(f, "Forecast service not initialized"),
        }
    }
}

impl std::error::Error for ForecastError {}

impl ForecastError {
    fn from_weather(office_code: &str, e: WeatherError) -> Self {
        match e {
            e if e.is_not_found() => ForecastError::NotFound(office_code.to_string()),
            WeatherError::Status { status, .. } => ForecastError::Server(status),
            WeatherError::Parse(s) | WeatherError::Document(s) | WeatherError::InvalidDate(s) => {
                ForecastError::Document(s)
            }
            WeatherError::Network(e) => match e.into_network_error() {
                NetworkError::Timeout => ForecastError::Timeout,
                other => ForecastError::Network(other.to_string()),
            },
        }
    }
}

/// Messages sent from async operations back to the interactive thread
#[derive(Debug)]
pub enum ForecastServiceMessage {
    /// Result of fetching a forecast for the selection `generation`
    FetchDone {
        generation: u64,
        office_code: String,
        result: Result<Forecast, ForecastError>,
    },
}

/// Request a forecast fetch asynchronously.
/// Sends `FetchDone` on the channel when complete; sends nothing if
/// `token` is cancelled first.
pub fn request_fetch(
    tx: &Sender<ForecastServiceMessage>,
    runtime: Option<&Handle>,
    provider: Arc<JmaProvider>,
    office_code: String,
    generation: u64,
    token: CancellationToken,
) {
    let tx = tx.clone();
    let runtime = match runtime {
        Some(r) => r,
        None => {
            let _ = tx.send(ForecastServiceMessage::FetchDone {
                generation,
                office_code,
                result: Err(ForecastError::NotInitialized),
            });
            return;
        }
    };

    runtime.spawn(async move {
        let result = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(office = %office_code, generation, "Forecast fetch cancelled");
                return;
            }
            result = provider.forecast(&office_code) => result,
        };

        let result = result.map_err(|e| ForecastError::from_weather(&office_code, e));
        if let Ok(forecast) = &result {
            tracing::info!(
                office = %office_code,
                rows = forecast.rows.len(),
                "Forecast fetched"
            );
        }

        let _ = tx.send(ForecastServiceMessage::FetchDone {
            generation,
            office_code,
            result,
        });
    });
}

/// Owns the in-flight fetch and replaces it on every new selection
pub struct ForecastService {
    tx: Sender<ForecastServiceMessage>,
    runtime: Option<Handle>,
    provider: Arc<JmaProvider>,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl ForecastService {
    pub fn new(
        tx: Sender<ForecastServiceMessage>,
        runtime: Option<Handle>,
        provider: Arc<JmaProvider>,
    ) -> Self {
        Self {
            tx,
            runtime,
            provider,
            in_flight: Mutex::new(None),
        }
    }

    /// Start fetching `office_code`, cancelling any earlier fetch
    pub fn select(&self, office_code: &str, generation: u64) {
        let token = CancellationToken::new();
        if let Some(previous) = self.in_flight.lock().replace(token.clone()) {
            previous.cancel();
        }

        request_fetch(
            &self.tx,
            self.runtime.as_ref(),
            self.provider.clone(),
            office_code.to_string(),
            generation,
            token,
        );
    }

    /// Cancel the in-flight fetch, if any
    pub fn cancel(&self) {
        if let Some(token) = self.in_flight.lock().take() {
            token.cancel();
        }
    }
}

impl Drop for ForecastService {
    fn drop(&mut self) {
        self.cancel();
    }
}
