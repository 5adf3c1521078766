//! Projection of filtered destinations into recommendations

use crate::airports::city_name_for_code;
use crate::models::{Recommendation, WeatherSummary};
use crate::preference::AcceptedDestination;

/// Recommendations in the order the destinations were accepted
#[must_use]
pub fn assemble(accepted: Vec<AcceptedDestination>) -> Vec<Recommendation> {
    accepted.into_iter().map(Recommendation::from).collect()
}

impl From<AcceptedDestination> for Recommendation {
    fn from(accepted: AcceptedDestination) -> Self {
        let AcceptedDestination {
            destination,
            headline,
        } = accepted;

        Recommendation {
            city: city_name_for_code(&destination.candidate.code).to_string(),
            code: destination.candidate.code,
            country: destination.candidate.country,
            travel_options: vec![destination.flight],
            lodging: destination.lodging,
            attractions: destination.attractions,
            weather: headline.map(|entry| WeatherSummary {
                description: entry.description,
                temperature: entry.temperature,
            }),
        }
    }
}
