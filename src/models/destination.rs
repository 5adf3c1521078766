//! Destination candidates and their enrichment

use super::WeatherForecast;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A destination returned by the flight search, before enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationCandidate {
    /// Provider location code (IATA)
    pub code: String,
    pub country: Option<String>,
    /// Round trip flight price for the whole group
    pub flight_price: f64,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    /// Absent when the provider had no geo data for the destination
    pub coordinates: Option<Coordinates>,
}

impl DestinationCandidate {
    #[must_use]
    pub fn new(code: impl Into<String>, flight_price: f64) -> Self {
        Self {
            code: code.into(),
            country: None,
            flight_price,
            departure_date: None,
            return_date: None,
            coordinates: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates {
            latitude,
            longitude,
        });
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// A hotel offer at the destination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LodgingOffer {
    pub name: String,
    /// Total price of the stay
    pub price: f64,
}

/// A point of interest near the destination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attraction {
    pub name: String,
    pub category: Option<String>,
}

/// One way of getting to the destination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
}

impl TravelOption {
    #[must_use]
    pub fn flight(price: f64) -> Self {
        Self {
            kind: "Flight".to_string(),
            price,
        }
    }
}

/// A candidate with lodging, attractions and weather attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedDestination {
    pub candidate: DestinationCandidate,
    pub flight: TravelOption,
    /// Budget the lodging offers were checked against
    pub lodging_budget: f64,
    pub lodging: Vec<LodgingOffer>,
    pub attractions: Vec<Attraction>,
    /// `None` when the forecast could not be fetched
    pub forecast: Option<WeatherForecast>,
}
