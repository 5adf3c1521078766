//! Data models for the getaway recommender
//!
//! This module contains the core domain models organized by concern:
//! - Criteria: what the traveler asked for and the budgets derived from it
//! - Destination: candidates from the flight search and their enrichment
//! - Forecast: weather forecast entries per destination
//! - Recommendation: the rendering-ready output of a search

pub mod criteria;
pub mod destination;
pub mod forecast;
pub mod recommendation;

// Re-export all public types for convenient access
pub use criteria::{Activity, DepartureDay, SearchCriteria, total_budget};
pub use destination::{
    Attraction, Coordinates, DestinationCandidate, EnrichedDestination, LodgingOffer, TravelOption,
};
pub use forecast::{ForecastEntry, WeatherForecast};
pub use recommendation::{Recommendation, WeatherSummary};
