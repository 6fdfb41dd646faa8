use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Placeholder substituted with the office code in the forecast URL template
pub const OFFICE_CODE_PLACEHOLDER: &str = "{code}";

/// Substitute `office_code` into a forecast URL template
pub fn expand_forecast_url(template: &str, office_code: &str) -> String {
    template.replace(OFFICE_CODE_PLACEHOLDER, office_code)
}

const DEFAULT_AREA_URL: &str = "https://www.jma.go.jp/bosai/common/const/area.json";
const DEFAULT_FORECAST_URL: &str = "https://www.jma.go.jp/bosai/forecast/data/forecast/{code}.json";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// JMA feed endpoints
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Display preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Area definition document (centers and offices)
    pub area_url: String,

    /// Per-office forecast document, `{code}` is replaced with the office code
    pub forecast_url_template: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            area_url: DEFAULT_AREA_URL.to_string(),
            forecast_url_template: DEFAULT_FORECAST_URL.to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl EndpointsConfig {
    /// Forecast URL for a single office
    pub fn forecast_url(&self, office_code: &str) -> String {
        expand_forecast_url(&self.forecast_url_template, office_code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Title shown above the navigation
    pub title: String,

    /// Width of the divider under the forecast title, in columns
    #[serde(default = "default_divider_width")]
    pub divider_width: u32,

    /// Show min/max temperature columns next to the weather text
    #[serde(default)]
    pub show_temperatures: bool,
}

fn default_divider_width() -> u32 {
    40
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "気象庁 天気予報アプリ".to_string(),
            divider_width: default_divider_width(),
            show_temperatures: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jma-weather");

        Self {
            config_dir,
            endpoints: EndpointsConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults when absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("{}: {}", config_path.display(), e))
        })?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Fails with [`ConfigError::Invalid`] if validation finds errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        Self::check(config)
    }

    /// Validate an already loaded configuration, logging warnings
    pub fn check(config: Self) -> Result<(Self, ValidationResult)> {
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.endpoints.area_url, "endpoints.area_url", &mut result);

        let template = &self.endpoints.forecast_url_template;
        if !template.contains(OFFICE_CODE_PLACEHOLDER) {
            result.add_error(
                "endpoints.forecast_url_template",
                format!("Template must contain {}", OFFICE_CODE_PLACEHOLDER),
            );
        }
        // Check the template with a plausible office code in place
        self.validate_url(
            &self.endpoints.forecast_url("130000"),
            "endpoints.forecast_url_template",
            &mut result,
        );

        if self.endpoints.request_timeout_secs == 0 {
            result.add_error(
                "endpoints.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.endpoints.request_timeout_secs > 300 {
            result.add_warning(
                "endpoints.request_timeout_secs",
                "Request timeout is unusually long (>300s)",
            );
        }

        if self.ui.divider_width == 0 {
            result.add_error("ui.divider_width", "Divider width must be greater than 0");
        } else if self.ui.divider_width > 400 {
            result.add_warning("ui.divider_width", "Divider width is unusually large (>400)");
        }

        if self.ui.title.trim().is_empty() {
            result.add_warning("ui.title", "Title is empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no user configuration directory".into()))?
            .join("jma-weather");

        Ok(config_dir.join("config.toml"))
    }
}
