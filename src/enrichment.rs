//! Per-destination enrichment fan-out
//!
//! Every candidate gets lodging, attractions and a forecast fetched
//! concurrently. A failed sub-fetch only empties its own field.

use futures::{StreamExt, future, stream};
use tracing::{debug, info, warn};

use crate::airports::city_name_for_code;
use crate::auth::AccessToken;
use crate::config::{NegativeLodgingPolicy, SearchConfig};
use crate::models::{
    Attraction, Coordinates, DestinationCandidate, EnrichedDestination, LodgingOffer,
    SearchCriteria, TravelOption, WeatherForecast,
};
use crate::travel::TravelDataProvider;
use crate::weather::ForecastProvider;

pub struct Enricher<'a, P: TravelDataProvider + ?Sized, W: ForecastProvider + ?Sized> {
    travel: &'a P,
    weather: &'a W,
    settings: &'a SearchConfig,
}

impl<'a, P, W> Enricher<'a, P, W>
where
    P: TravelDataProvider + ?Sized,
    W: ForecastProvider + ?Sized,
{
    pub fn new(travel: &'a P, weather: &'a W, settings: &'a SearchConfig) -> Self {
        Self {
            travel,
            weather,
            settings,
        }
    }

    /// Enrich all candidates, output in input order
    pub async fn enrich_all(
        &self,
        token: &AccessToken,
        criteria: &SearchCriteria,
        candidates: Vec<DestinationCandidate>,
    ) -> Vec<EnrichedDestination> {
        let total = candidates.len();
        let pending: Vec<_> = candidates
            .into_iter()
            .map(|candidate| self.enrich(token, criteria, candidate))
            .collect();

        let enriched: Vec<EnrichedDestination> = stream::iter(pending)
            .buffered(self.settings.enrichment_concurrency.max(1))
            .filter_map(future::ready)
            .collect()
            .await;

        info!("Enriched {} of {} destinations", enriched.len(), total);
        enriched
    }

    /// `None` when the candidate is dropped by the negative lodging policy
    pub async fn enrich(
        &self,
        token: &AccessToken,
        criteria: &SearchCriteria,
        candidate: DestinationCandidate,
    ) -> Option<EnrichedDestination> {
        let lodging_budget = criteria.lodging_budget(candidate.flight_price);
        if lodging_budget < 0.0
            && self.settings.negative_lodging == NegativeLodgingPolicy::DropCandidate
        {
            info!(
                "Dropping {}: flight price {} leaves no lodging budget",
                candidate.code, candidate.flight_price
            );
            return None;
        }

        let category = criteria.activity.category();
        let city = city_name_for_code(&candidate.code);

        let (lodging, attractions, forecast) = tokio::join!(
            self.lodging(token, &candidate.code, lodging_budget),
            self.attractions(token, &candidate.code, candidate.coordinates, category.as_deref()),
            self.forecast(city),
        );

        Some(EnrichedDestination {
            flight: TravelOption::flight(candidate.flight_price),
            candidate,
            lodging_budget,
            lodging,
            attractions,
            forecast,
        })
    }

    async fn lodging(&self, token: &AccessToken, code: &str, budget: f64) -> Vec<LodgingOffer> {
        if budget < 0.0 {
            debug!("Skipping lodging for {}: budget {} is negative", code, budget);
            return Vec::new();
        }

        match self.travel.hotel_offers(token, code, budget).await {
            Ok(offers) => offers
                .into_iter()
                .filter(|offer| {
                    let within = offer.price <= budget;
                    if !within {
                        debug!(
                            "Discarding {} at {}: over lodging budget {}",
                            offer.name, offer.price, budget
                        );
                    }
                    within
                })
                .collect(),
            Err(e) => {
                warn!("Lodging lookup for {} failed: {}", code, e);
                Vec::new()
            }
        }
    }

    async fn attractions(
        &self,
        token: &AccessToken,
        code: &str,
        coordinates: Option<Coordinates>,
        category: Option<&str>,
    ) -> Vec<Attraction> {
        let Some(near) = coordinates else {
            debug!("Skipping attractions for {}: no coordinates", code);
            return Vec::new();
        };

        match self.travel.points_of_interest(token, near, category).await {
            Ok(attractions) => attractions,
            Err(e) => {
                warn!("Attraction lookup for {} failed: {}", code, e);
                Vec::new()
            }
        }
    }

    async fn forecast(&self, city: &str) -> Option<WeatherForecast> {
        match self.weather.forecast(city).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                warn!("Forecast for {} failed: {}", city, e);
                None
            }
        }
    }
}
