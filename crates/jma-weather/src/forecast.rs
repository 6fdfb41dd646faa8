//! Forecast rows from a JMA forecast document.
//!
//! The weather series (`timeSeries[0]`) drives the rows. Temperatures come
//! from `timeSeries[2]`, whose lists cover a different and usually shorter
//! date range. They are paired with the weather dates by list position only,
//! with no date matching, and a missing position shows [`MISSING_VALUE`].
//! This pairing is fragile but intentional; keep it positional.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::{Forecast, ForecastEdition, ForecastRow, SeriesArea, WeatherError};

/// Shown in place of a temperature that is not published
pub const MISSING_VALUE: &str = "-";

const WEATHER_SERIES: usize = 0;
const TEMPERATURE_SERIES: usize = 2;

/// Render the most current edition of a forecast document into rows.
pub fn render_forecast(
    office_code: &str,
    editions: &[ForecastEdition],
) -> Result<Forecast, WeatherError> {
    let edition = editions
        .first()
        .ok_or_else(|| WeatherError::Document("forecast has no editions".into()))?;

    let weather_series = edition.time_series.get(WEATHER_SERIES).ok_or_else(|| {
        WeatherError::Document("forecast has no weather time series".into())
    })?;
    let weather_area = weather_series.areas.first().ok_or_else(|| {
        WeatherError::Document("weather time series has no areas".into())
    })?;

    let dates = &weather_series.time_defines;
    let weathers = &weather_area.weathers;
    if weathers.len() < dates.len() {
        return Err(WeatherError::Document(format!(
            "{} weathers for {} dates",
            weathers.len(),
            dates.len()
        )));
    }

    let empty = SeriesArea::default();
    let temp_area = match edition.time_series.get(TEMPERATURE_SERIES) {
        Some(series) => series.areas.first().ok_or_else(|| {
            WeatherError::Document("temperature time series has no areas".into())
        })?,
        None => &empty,
    };

    let rows = dates
        .iter()
        .zip(weathers)
        .enumerate()
        .map(|(i, (date, weather))| {
            Ok(ForecastRow {
                date: format_date(date)?,
                weather: weather.clone(),
                min_temp: value_at(&temp_area.temps_min, i),
                max_temp: value_at(&temp_area.temps_max, i),
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    tracing::debug!(
        office = office_code,
        rows = rows.len(),
        temps_min = temp_area.temps_min.len(),
        temps_max = temp_area.temps_max.len(),
        "Rendered forecast"
    );

    Ok(Forecast {
        office_code: office_code.to_string(),
        publishing_office: edition.publishing_office.clone(),
        rows,
    })
}

/// Value at `index`, or the sentinel when out of range or empty
fn value_at(values: &[String], index: usize) -> String {
    values
        .get(index)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

/// Format an ISO-8601 date-time as `MM/DD`.
///
/// The calendar date is taken as written; any UTC offset is parsed but no
/// timezone conversion is applied.
pub fn format_date(value: &str) -> Result<String, WeatherError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.format("%m/%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.format("%m/%d").to_string());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.format("%m/%d").to_string())
        .map_err(|e| WeatherError::InvalidDate(format!("{}: {}", value, e)))
}
