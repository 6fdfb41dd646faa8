//! Terminal front end for JMA Weather: application state, background
//! forecast fetching and the interactive shell.

pub mod bridge;
mod error_mapping;
pub mod services;
pub mod shell;
pub mod state;
pub mod views;

pub use services::{ForecastError, ForecastService, ForecastServiceMessage};
pub use shell::{Command, Control, Shell};
pub use state::{AppState, Applied};
