//! Rendering-ready search results

use super::{Attraction, LodgingOffer, TravelOption};
use serde::{Deserialize, Serialize};

/// Weather shown next to a recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSummary {
    pub description: String,
    #[serde(rename = "temp")]
    pub temperature: f32,
}

/// One recommended getaway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Provider location code
    pub code: String,
    pub city: String,
    pub country: Option<String>,
    pub travel_options: Vec<TravelOption>,
    pub lodging: Vec<LodgingOffer>,
    pub attractions: Vec<Attraction>,
    pub weather: Option<WeatherSummary>,
}
