//! Forecast data for JMA Weather
//!
//! Fetches the Japan Meteorological Agency area and forecast feeds and
//! shapes them into a region navigation index and date-aligned forecast rows.

pub mod forecast;
pub mod provider;
pub mod region;
pub mod types;

pub use forecast::{format_date, render_forecast, MISSING_VALUE};
pub use provider::JmaProvider;
pub use region::build_region_index;
pub use types::*;
