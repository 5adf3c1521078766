//! Configuration management for the getaway recommender
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::GetawayError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Share of the total budget offered to the flight search.
///
/// Earlier revisions of the recommender used 0.6; 0.4 leaves the larger share
/// for lodging and is the default.
pub const DEFAULT_FLIGHT_BUDGET_RATIO: f64 = 0.4;

/// Root configuration structure for the getaway recommender
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GetawayConfig {
    /// Travel data provider (flights, hotels, points of interest)
    #[serde(default)]
    pub amadeus: AmadeusConfig,
    /// Weather provider
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Pipeline tuning
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// A credential that must never show up in logs.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// Raw value, for building requests only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("[redacted]")
    }
}

/// Travel data provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    /// OAuth2 client id
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 client secret
    #[serde(default)]
    pub client_secret: Secret,
    /// Base URL for all travel data endpoints, including the token endpoint
    #[serde(default = "default_amadeus_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Currency used for hotel price ranges
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Weather API key
    #[serde(default)]
    pub api_key: Secret,
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Unit system (standard, metric, imperial)
    #[serde(default = "default_weather_units")]
    pub units: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// What to do with a destination whose flight alone exceeds the total budget
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NegativeLodgingPolicy {
    /// Keep the destination with no lodging offers
    #[default]
    EmptyLodging,
    /// Remove the destination from the results
    DropCandidate,
}

/// Which forecast entries the weather preference is matched against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherMatchMode {
    /// Any entry of the whole multi-day forecast
    #[default]
    AnyEntry,
    /// Only entries on the departure date between the window hours
    DepartureWindow,
}

/// Pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Share of the total budget used as the maximum flight price
    #[serde(default = "default_flight_budget_ratio")]
    pub flight_budget_ratio: f64,
    /// Maximum number of destinations enriched per search
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Maximum number of destinations enriched at the same time
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,
    /// Hotel search radius in kilometers
    #[serde(default = "default_hotel_radius")]
    pub hotel_radius_km: u32,
    /// Points of interest search radius in kilometers
    #[serde(default = "default_poi_radius")]
    pub poi_radius_km: u32,
    #[serde(default)]
    pub negative_lodging: NegativeLodgingPolicy,
    #[serde(default)]
    pub weather_match: WeatherMatchMode,
    /// First local hour of the departure window (inclusive)
    #[serde(default = "default_window_start_hour")]
    pub window_start_hour: u32,
    /// Last local hour of the departure window (inclusive)
    #[serde(default = "default_window_end_hour")]
    pub window_end_hour: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint for span export, disabled when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// PEM certificate, TLS is enabled when both cert and key are set
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,
    /// PEM private key
    #[serde(default)]
    pub tls_key: Option<PathBuf>,
}

// Default value functions
fn default_amadeus_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_units() -> String {
    "imperial".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_flight_budget_ratio() -> f64 {
    DEFAULT_FLIGHT_BUDGET_RATIO
}

fn default_max_candidates() -> usize {
    10
}

fn default_enrichment_concurrency() -> usize {
    8
}

fn default_hotel_radius() -> u32 {
    10
}

fn default_poi_radius() -> u32 {
    10
}

fn default_window_start_hour() -> u32 {
    6
}

fn default_window_end_hour() -> u32 {
    21
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: Secret::default(),
            base_url: default_amadeus_base_url(),
            timeout_seconds: default_timeout(),
            currency: default_currency(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::default(),
            base_url: default_weather_base_url(),
            units: default_weather_units(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            flight_budget_ratio: default_flight_budget_ratio(),
            max_candidates: default_max_candidates(),
            enrichment_concurrency: default_enrichment_concurrency(),
            hotel_radius_km: default_hotel_radius(),
            poi_radius_km: default_poi_radius(),
            negative_lodging: NegativeLodgingPolicy::default(),
            weather_match: WeatherMatchMode::default(),
            window_start_hour: default_window_start_hour(),
            window_end_hour: default_window_end_hour(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl GetawayConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // GETAWAY_AMADEUS__CLIENT_ID -> amadeus.client_id
        builder = builder.add_source(
            Environment::with_prefix("GETAWAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GetawayConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("getaway").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.amadeus.base_url.is_empty() {
            self.amadeus.base_url = default_amadeus_base_url();
        }
        if self.amadeus.timeout_seconds == 0 {
            self.amadeus.timeout_seconds = default_timeout();
        }
        if self.amadeus.currency.is_empty() {
            self.amadeus.currency = default_currency();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.units.is_empty() {
            self.weather.units = default_weather_units();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.search.max_candidates == 0 {
            self.search.max_candidates = default_max_candidates();
        }
        if self.search.enrichment_concurrency == 0 {
            self.search.enrichment_concurrency = default_enrichment_concurrency();
        }
        if self.search.hotel_radius_km == 0 {
            self.search.hotel_radius_km = default_hotel_radius();
        }
        if self.search.poi_radius_km == 0 {
            self.search.poi_radius_km = default_poi_radius();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if self.amadeus.client_id.is_empty() || self.amadeus.client_secret.is_empty() {
            return Err(GetawayError::config(
                "Travel data client id and secret are required (GETAWAY_AMADEUS__CLIENT_ID, GETAWAY_AMADEUS__CLIENT_SECRET)",
            )
            .into());
        }

        if self.weather.api_key.is_empty() {
            return Err(GetawayError::config(
                "Weather API key is required (GETAWAY_WEATHER__API_KEY)",
            )
            .into());
        }

        if self.weather.api_key.expose().len() < 8 {
            return Err(GetawayError::config(
                "Weather API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let ratio = self.search.flight_budget_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(GetawayError::config(format!(
                "Flight budget ratio must be in (0, 1], got {ratio}"
            ))
            .into());
        }

        if self.amadeus.timeout_seconds > 300 || self.weather.timeout_seconds > 300 {
            return Err(GetawayError::config("API timeouts cannot exceed 300 seconds").into());
        }

        if self.search.max_candidates > 50 {
            return Err(GetawayError::config("Maximum candidates cannot exceed 50").into());
        }

        if self.search.enrichment_concurrency > 64 {
            return Err(GetawayError::config("Enrichment concurrency cannot exceed 64").into());
        }

        if self.search.poi_radius_km > 20 {
            return Err(
                GetawayError::config("Points of interest radius cannot exceed 20 km").into(),
            );
        }

        if self.search.hotel_radius_km > 300 {
            return Err(GetawayError::config("Hotel radius cannot exceed 300 km").into());
        }

        if self.search.window_end_hour > 23
            || self.search.window_start_hour > self.search.window_end_hour
        {
            return Err(GetawayError::config(
                "Departure window hours must satisfy start <= end <= 23",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GetawayError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GetawayError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_units = ["standard", "metric", "imperial"];
        if !valid_units.contains(&self.weather.units.as_str()) {
            return Err(GetawayError::config(format!(
                "Invalid weather units '{}'. Must be one of: {}",
                self.weather.units,
                valid_units.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Travel data", &self.amadeus.base_url),
            ("Weather API", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GetawayError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
