//! Flight, hotel and points of interest data
//!
//! The pipeline talks to the travel data provider only through
//! [`TravelDataProvider`]; [`amadeus::AmadeusClient`] is the HTTP
//! implementation.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;
use crate::auth::AccessToken;
use crate::models::{Attraction, Coordinates, DestinationCandidate, LodgingOffer};

pub mod amadeus;

pub use amadeus::AmadeusClient;

/// Parameters of a destination search
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearch {
    /// Origin location code
    pub origin: String,
    pub max_price: u64,
    pub departure_date: Option<NaiveDate>,
}

#[async_trait]
pub trait TravelDataProvider: Send + Sync {
    /// Location code of the first city matching `keyword`
    async fn city_code(&self, token: &AccessToken, keyword: &str) -> Result<Option<String>>;

    /// Coordinates of the first city matching `code`
    async fn city_coordinates(
        &self,
        token: &AccessToken,
        code: &str,
    ) -> Result<Option<Coordinates>>;

    /// Destinations reachable from the origin within the price, in provider order
    async fn flight_destinations(
        &self,
        token: &AccessToken,
        search: &FlightSearch,
    ) -> Result<Vec<DestinationCandidate>>;

    async fn points_of_interest(
        &self,
        token: &AccessToken,
        near: Coordinates,
        category: Option<&str>,
    ) -> Result<Vec<Attraction>>;

    /// Hotel offers in the city; `max_price` is a hint the provider may ignore
    async fn hotel_offers(
        &self,
        token: &AccessToken,
        city_code: &str,
        max_price: f64,
    ) -> Result<Vec<LodgingOffer>>;
}
