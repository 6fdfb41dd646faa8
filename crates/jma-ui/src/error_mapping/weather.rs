use crate::services::ForecastError;
use jma_core::{AppError, NetworkError, WeatherError};

impl From<ForecastError> for AppError {
    fn from(e: ForecastError) -> Self {
        match e {
            ForecastError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            ForecastError::Timeout => AppError::Network(NetworkError::Timeout),
            ForecastError::Server(status) => AppError::Network(NetworkError::ServerError {
                status,
                message: status_message(status),
            }),
            ForecastError::NotFound(code) => AppError::Weather(WeatherError::OfficeNotFound(code)),
            ForecastError::Document(s) => AppError::Weather(WeatherError::MalformedDocument(s)),
            ForecastError::NotInitialized => AppError::Weather(WeatherError::ServiceUnavailable),
        }
    }
}

fn status_message(status: u16) -> String {
    format!("forecast request failed with HTTP {}", status)
}
