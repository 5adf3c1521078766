//! Weather forecasts per destination city

use async_trait::async_trait;

use crate::Result;
use crate::models::WeatherForecast;

pub mod open_weather;

pub use open_weather::OpenWeatherClient;

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Multi-entry forecast for a city name
    async fn forecast(&self, city: &str) -> Result<WeatherForecast>;
}
