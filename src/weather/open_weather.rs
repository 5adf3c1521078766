use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::ForecastProvider;
use crate::config::{Secret, WeatherConfig};
use crate::models::WeatherForecast;
use crate::{GetawayError, Result};

/// Client for the OpenWeatherMap 5 day / 3 hour forecast
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Secret,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("getaway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GetawayError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            units: config.units.clone(),
        })
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<WeatherForecast> {
        let url = format!(
            "{}/forecast?q={}&appid={}&units={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(self.api_key.expose()),
            self.units
        );

        // the key is part of the URL, so errors are reported without it
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GetawayError::api(format!("Forecast request failed: {}", e.without_url())))?;

        let status = response.status();
        let body: owm::ForecastResponse = response.json().await.map_err(|e| {
            GetawayError::api_status(
                format!("Invalid forecast response: {}", e.without_url()),
                status.as_u16(),
            )
        })?;

        if !status.is_success() || !body.is_ok() {
            let message = body
                .message
                .and_then(owm::Message::into_text)
                .unwrap_or_else(|| status.to_string());
            warn!("Forecast for {} failed: {}", city, message);
            return Err(GetawayError::api_status(
                format!("Forecast for {city} failed: {message}"),
                status.as_u16(),
            ));
        }

        let forecast = body.into_forecast(city);
        debug!("Received {} forecast entries for {}", forecast.entries.len(), city);
        Ok(forecast)
    }
}

/// `OpenWeatherMap` response structures and conversion utilities
mod owm {
    use chrono::DateTime;
    use serde::Deserialize;

    use crate::models::{ForecastEntry, WeatherForecast};

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub cod: Option<Code>,
        pub message: Option<Message>,
        #[serde(default)]
        pub list: Vec<Entry>,
        pub city: Option<City>,
    }

    /// `cod` is a string on success and sometimes a number on errors
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum Code {
        Number(u16),
        Text(String),
    }

    /// `message` is `0` on success and an explanation on errors
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum Message {
        Number(serde_json::Number),
        Text(String),
    }

    impl Message {
        pub fn into_text(self) -> Option<String> {
            match self {
                Message::Text(text) => Some(text),
                Message::Number(_) => None,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct Entry {
        pub dt: i64,
        pub main: Main,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f32,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        /// Shift in seconds from UTC
        #[serde(default)]
        pub timezone: i32,
    }

    impl ForecastResponse {
        pub fn is_ok(&self) -> bool {
            match &self.cod {
                Some(Code::Number(code)) => *code == 200,
                Some(Code::Text(code)) => code == "200",
                None => true,
            }
        }

        pub fn into_forecast(self, city: &str) -> WeatherForecast {
            let offset = self.city.map_or(0, |c| c.timezone);

            let mut entries: Vec<ForecastEntry> = self
                .list
                .into_iter()
                .filter_map(|entry| {
                    let timestamp = DateTime::from_timestamp(entry.dt, 0)?;
                    let description = entry
                        .weather
                        .into_iter()
                        .next()
                        .map(|c| c.description)
                        .unwrap_or_default();
                    Some(ForecastEntry::new(timestamp, description, entry.main.temp))
                })
                .collect();
            entries.sort_by_key(|e| e.timestamp);

            WeatherForecast::new(city, entries).with_utc_offset(offset)
        }
    }
}
