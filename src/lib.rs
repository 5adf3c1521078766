//! `getaway` - weekend getaway recommendations
//!
//! Combines flight destinations, hotel offers, points of interest and
//! weather forecasts into a list of affordable weekend trips.

pub mod airports;
pub mod api;
pub mod assembler;
pub mod auth;
pub mod config;
pub mod destination_search;
pub mod enrichment;
pub mod error;
pub mod getaway_service;
pub mod location_resolver;
pub mod models;
pub mod preference;
pub mod telemetry;
pub mod travel;
pub mod weather;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export core types for public API
pub use auth::{AccessToken, ClientCredentialsIssuer, TokenIssuer, TokenScope};
pub use config::GetawayConfig;
pub use error::GetawayError;
pub use getaway_service::{GetawayService, RecommendationSearch};
pub use models::{Recommendation, SearchCriteria};
pub use preference::matches_weather_preference;
pub use travel::{AmadeusClient, TravelDataProvider};
pub use weather::{ForecastProvider, OpenWeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GetawayError>;
