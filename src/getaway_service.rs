//! Getaway search pipeline
//!
//! Runs one search from criteria to recommendations: token, origin lookup,
//! destination search, enrichment, weather filtering and assembly.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{info, instrument};

use crate::assembler::assemble;
use crate::auth::{TokenIssuer, TokenScope};
use crate::config::SearchConfig;
use crate::destination_search::DestinationSearch;
use crate::enrichment::Enricher;
use crate::location_resolver::LocationResolver;
use crate::models::{Recommendation, SearchCriteria};
use crate::preference::PreferenceFilter;
use crate::travel::TravelDataProvider;
use crate::weather::ForecastProvider;
use crate::{GetawayError, Result};

/// Anything that can turn search criteria into recommendations
#[async_trait]
pub trait RecommendationSearch: Send + Sync {
    /// `now` is the local time the earliest departure is computed from
    async fn search(
        &self,
        criteria: &SearchCriteria,
        now: NaiveDateTime,
    ) -> Result<Vec<Recommendation>>;
}

/// Getaway service over a travel data provider, a token issuer and a
/// weather provider
pub struct GetawayService<P, I, W> {
    travel: P,
    issuer: I,
    weather: W,
    settings: SearchConfig,
}

impl<P, I, W> GetawayService<P, I, W>
where
    P: TravelDataProvider,
    I: TokenIssuer,
    W: ForecastProvider,
{
    pub fn new(travel: P, issuer: I, weather: W, settings: SearchConfig) -> Self {
        Self {
            travel,
            issuer,
            weather,
            settings,
        }
    }
}

#[async_trait]
impl<P, I, W> RecommendationSearch for GetawayService<P, I, W>
where
    P: TravelDataProvider,
    I: TokenIssuer,
    W: ForecastProvider,
{
    #[instrument(
        name = "getaway_search",
        skip(self, criteria, now),
        fields(location = %criteria.departure_location, day = %criteria.departure_day)
    )]
    async fn search(
        &self,
        criteria: &SearchCriteria,
        now: NaiveDateTime,
    ) -> Result<Vec<Recommendation>> {
        info!(
            "Searching getaways for {} travelers with {} total",
            criteria.travelers,
            criteria.total_budget()
        );

        let scope = TokenScope::new(&self.issuer);
        let token = scope.token().await?;

        let origin = LocationResolver::resolve_location_code(
            &self.travel,
            token,
            &criteria.departure_location,
        )
        .await?
        .ok_or_else(|| GetawayError::LocationNotFound {
            location: criteria.departure_location.clone(),
        })?;

        let departure = criteria.departure_day.earliest_departure(now);
        let max_flight_price = criteria.max_flight_price(self.settings.flight_budget_ratio);
        info!(
            "Departing {} from {} on {}, flights up to {}",
            criteria.departure_day, origin, departure, max_flight_price
        );

        let candidates = DestinationSearch::new(&self.travel, &self.settings)
            .search_destinations(token, &origin, max_flight_price, Some(departure.date()))
            .await?;

        let enriched = Enricher::new(&self.travel, &self.weather, &self.settings)
            .enrich_all(token, criteria, candidates)
            .await;

        let accepted = PreferenceFilter::from_settings(&self.settings).apply(
            enriched,
            criteria.weather_preference.as_deref(),
            departure.date(),
        );

        let recommendations = assemble(accepted);
        info!("Found {} recommendations", recommendations.len());
        Ok(recommendations)
    }
}
