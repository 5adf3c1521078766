//! Destination search within the flight sub-budget

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::AccessToken;
use crate::config::SearchConfig;
use crate::location_resolver::LocationResolver;
use crate::models::DestinationCandidate;
use crate::travel::{FlightSearch, TravelDataProvider};
use crate::{GetawayError, Result};

pub struct DestinationSearch<'a, P: TravelDataProvider + ?Sized> {
    provider: &'a P,
    settings: &'a SearchConfig,
}

impl<'a, P: TravelDataProvider + ?Sized> DestinationSearch<'a, P> {
    pub fn new(provider: &'a P, settings: &'a SearchConfig) -> Self {
        Self { provider, settings }
    }

    /// Candidates reachable from `origin` for at most `max_flight_price`,
    /// in provider order, with coordinates backfilled where possible.
    #[instrument(skip(self, token))]
    pub async fn search_destinations(
        &self,
        token: &AccessToken,
        origin: &str,
        max_flight_price: u64,
        departure_date: Option<NaiveDate>,
    ) -> Result<Vec<DestinationCandidate>> {
        let search = FlightSearch {
            origin: origin.to_string(),
            max_price: max_flight_price,
            departure_date,
        };

        let candidates = self
            .provider
            .flight_destinations(token, &search)
            .await
            .map_err(|e| {
                error!("Destination search from {} failed: {}", origin, e);
                match e {
                    GetawayError::Credential { .. } => e,
                    other => GetawayError::search(other.to_string()),
                }
            })?;

        let received = candidates.len();
        let mut candidates: Vec<DestinationCandidate> = candidates
            .into_iter()
            .filter(|candidate| {
                let within = candidate.flight_price <= max_flight_price as f64;
                if !within {
                    warn!(
                        "Dropping {}: flight price {} exceeds {}",
                        candidate.code, candidate.flight_price, max_flight_price
                    );
                }
                within
            })
            .collect();
        candidates.truncate(self.settings.max_candidates);

        if candidates.is_empty() {
            info!("No destinations from {} within {}", origin, max_flight_price);
            return Err(GetawayError::NoDestinations { max_flight_price });
        }

        debug!("Keeping {} of {} destinations", candidates.len(), received);
        Ok(self.backfill_coordinates(token, candidates).await)
    }

    async fn backfill_coordinates(
        &self,
        token: &AccessToken,
        candidates: Vec<DestinationCandidate>,
    ) -> Vec<DestinationCandidate> {
        let lookups = candidates.into_iter().map(|mut candidate| async move {
            if candidate.coordinates.is_none() {
                candidate.coordinates =
                    LocationResolver::resolve_coordinates(self.provider, token, &candidate.code)
                        .await;
            }
            candidate
        });

        join_all(lookups).await
    }
}
