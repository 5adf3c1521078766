//! In-process providers for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::auth::{AccessToken, TokenIssuer};
use crate::models::{
    Attraction, Coordinates, DestinationCandidate, LodgingOffer, WeatherForecast,
};
use crate::travel::{FlightSearch, TravelDataProvider};
use crate::weather::ForecastProvider;
use crate::{GetawayError, Result};

#[derive(Default)]
pub struct FakeTravel {
    pub city_codes: HashMap<String, String>,
    pub coordinates: HashMap<String, Coordinates>,
    /// `None` makes the flight search fail
    pub destinations: Option<Vec<DestinationCandidate>>,
    pub hotels: HashMap<String, Vec<LodgingOffer>>,
    pub failing_hotels: HashSet<String>,
    pub attractions: Vec<Attraction>,
    /// City lookups answer as if the token was rejected
    pub rejects_token: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeTravel {
    pub fn with_destinations(destinations: Vec<DestinationCandidate>) -> Self {
        Self {
            destinations: Some(destinations),
            ..Self::default()
        }
    }

    pub fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl TravelDataProvider for FakeTravel {
    async fn city_code(&self, _token: &AccessToken, keyword: &str) -> Result<Option<String>> {
        self.record(format!("city_code:{keyword}"));
        if self.rejects_token {
            return Err(GetawayError::credential("access token rejected"));
        }
        Ok(self.city_codes.get(keyword).cloned())
    }

    async fn city_coordinates(
        &self,
        _token: &AccessToken,
        code: &str,
    ) -> Result<Option<Coordinates>> {
        self.record(format!("coordinates:{code}"));
        Ok(self.coordinates.get(code).copied())
    }

    async fn flight_destinations(
        &self,
        _token: &AccessToken,
        search: &FlightSearch,
    ) -> Result<Vec<DestinationCandidate>> {
        self.record(format!("flights:{}:{}", search.origin, search.max_price));
        self.destinations
            .clone()
            .ok_or_else(|| GetawayError::api_status("flight search unavailable", 500))
    }

    async fn points_of_interest(
        &self,
        _token: &AccessToken,
        near: Coordinates,
        category: Option<&str>,
    ) -> Result<Vec<Attraction>> {
        self.record(format!(
            "pois:{},{}:{}",
            near.latitude,
            near.longitude,
            category.unwrap_or("-")
        ));
        Ok(self.attractions.clone())
    }

    async fn hotel_offers(
        &self,
        _token: &AccessToken,
        city_code: &str,
        max_price: f64,
    ) -> Result<Vec<LodgingOffer>> {
        self.record(format!("hotels:{city_code}:{max_price}"));
        if self.failing_hotels.contains(city_code) {
            return Err(GetawayError::api("hotel search unavailable"));
        }
        Ok(self.hotels.get(city_code).cloned().unwrap_or_default())
    }
}

/// Forecasts keyed by city name; unknown cities fail
#[derive(Default)]
pub struct FakeWeather {
    pub forecasts: HashMap<String, WeatherForecast>,
}

#[async_trait]
impl ForecastProvider for FakeWeather {
    async fn forecast(&self, city: &str) -> Result<WeatherForecast> {
        self.forecasts
            .get(city)
            .cloned()
            .ok_or_else(|| GetawayError::api_status(format!("no forecast for {city}"), 404))
    }
}

#[derive(Default)]
pub struct FakeIssuer {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TokenIssuer for FakeIssuer {
    async fn acquire_token(&self) -> Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(GetawayError::credential("invalid client"))
        } else {
            Ok(AccessToken::new("fake-token"))
        }
    }
}
