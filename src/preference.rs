//! Weather preference filtering

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{SearchConfig, WeatherMatchMode};
use crate::models::{EnrichedDestination, ForecastEntry};

/// Whether a forecast satisfies a weather preference.
///
/// No preference accepts everything, including destinations without a
/// forecast. With a preference, a missing forecast is rejected and otherwise
/// any entry whose description contains the preference (ignoring case)
/// is enough.
pub fn matches_weather_preference<'a, I>(forecast: Option<I>, preference: Option<&str>) -> bool
where
    I: IntoIterator<Item = &'a ForecastEntry>,
{
    let Some(preference) = preference.map(str::trim).filter(|p| !p.is_empty()) else {
        return true;
    };
    let Some(entries) = forecast else {
        return false;
    };

    let needle = preference.to_lowercase();
    entries
        .into_iter()
        .any(|entry| entry.description.to_lowercase().contains(&needle))
}

/// A destination that passed the filter, with the entry to show for it
#[derive(Debug, Clone)]
pub struct AcceptedDestination {
    pub destination: EnrichedDestination,
    /// First forecast entry considered by the filter
    pub headline: Option<ForecastEntry>,
}

#[derive(Debug, Clone)]
pub struct PreferenceFilter {
    mode: WeatherMatchMode,
    window_start_hour: u32,
    window_end_hour: u32,
}

impl PreferenceFilter {
    #[must_use]
    pub fn from_settings(settings: &SearchConfig) -> Self {
        Self {
            mode: settings.weather_match,
            window_start_hour: settings.window_start_hour,
            window_end_hour: settings.window_end_hour,
        }
    }

    /// Forecast entries the preference is matched against
    fn relevant_entries<'a>(
        &self,
        destination: &'a EnrichedDestination,
        departure_date: NaiveDate,
    ) -> Option<Vec<&'a ForecastEntry>> {
        let forecast = destination.forecast.as_ref()?;
        Some(match self.mode {
            WeatherMatchMode::AnyEntry => forecast.entries.iter().collect(),
            WeatherMatchMode::DepartureWindow => forecast.entries_within(
                departure_date,
                self.window_start_hour,
                self.window_end_hour,
            ),
        })
    }

    /// Keep destinations matching `preference`, in input order
    pub fn apply(
        &self,
        destinations: Vec<EnrichedDestination>,
        preference: Option<&str>,
        departure_date: NaiveDate,
    ) -> Vec<AcceptedDestination> {
        destinations
            .into_iter()
            .filter_map(|destination| {
                let entries = self.relevant_entries(&destination, departure_date);
                if !matches_weather_preference(entries.clone(), preference) {
                    debug!(
                        "{} does not match weather preference {:?}",
                        destination.candidate.code, preference
                    );
                    return None;
                }

                let headline = entries.and_then(|e| e.first().map(|entry| (*entry).clone()));
                Some(AcceptedDestination {
                    destination,
                    headline,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DestinationCandidate, TravelOption, WeatherForecast};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn entries(descriptions: &[&str]) -> Vec<ForecastEntry> {
        descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| {
                ForecastEntry::new(
                    Utc.with_ymd_and_hms(2024, 6, 14, 9 + i as u32 * 3, 0, 0).unwrap(),
                    *d,
                    75.0,
                )
            })
            .collect()
    }

    #[rstest]
    #[case(&["Sunny", "clear sky"], Some("sunny"), true)]
    #[case(&["light rain"], Some("sunny"), false)]
    #[case(&["light rain"], None, true)]
    #[case(&["light rain"], Some("   "), true)]
    #[case(&["Mostly SUNNY intervals"], Some("Sunny"), true)]
    #[case(&[], Some("sunny"), false)]
    fn test_matches_weather_preference(
        #[case] descriptions: &[&str],
        #[case] preference: Option<&str>,
        #[case] expected: bool,
    ) {
        let forecast = entries(descriptions);
        assert_eq!(
            matches_weather_preference(Some(&forecast), preference),
            expected
        );
    }

    #[test]
    fn test_missing_forecast() {
        assert!(matches_weather_preference(None::<&[ForecastEntry]>, None));
        assert!(!matches_weather_preference(
            None::<&[ForecastEntry]>,
            Some("sunny")
        ));
    }

    fn destination(code: &str, forecast: Option<WeatherForecast>) -> EnrichedDestination {
        EnrichedDestination {
            candidate: DestinationCandidate::new(code, 100.0),
            flight: TravelOption::flight(100.0),
            lodging_budget: 500.0,
            lodging: vec![],
            attractions: vec![],
            forecast,
        }
    }

    #[test]
    fn test_apply_keeps_order_and_headline() {
        let filter = PreferenceFilter::from_settings(&SearchConfig::default());
        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();

        let accepted = filter.apply(
            vec![
                destination("MIA", Some(WeatherForecast::new("Miami", entries(&["mild breeze"])))),
                destination("LAS", None),
                destination("MCO", Some(WeatherForecast::new("Orlando", entries(&["hot", "Mild"])))),
            ],
            Some("mild"),
            date,
        );

        let codes: Vec<&str> = accepted
            .iter()
            .map(|a| a.destination.candidate.code.as_str())
            .collect();
        assert_eq!(codes, vec!["MIA", "MCO"]);
        assert_eq!(
            accepted[1].headline.as_ref().map(|e| e.description.as_str()),
            Some("hot")
        );
    }

    #[test]
    fn test_departure_window_mode_narrows_entries() {
        let settings = SearchConfig {
            weather_match: WeatherMatchMode::DepartureWindow,
            ..SearchConfig::default()
        };
        let filter = PreferenceFilter::from_settings(&settings);

        // sunny only on the day after departure
        let mut forecast_entries = entries(&["cloudy"]);
        forecast_entries.push(ForecastEntry::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            "sunny",
            80.0,
        ));
        let forecast = WeatherForecast::new("Miami", forecast_entries);

        let friday = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        assert!(filter
            .apply(vec![destination("MIA", Some(forecast.clone()))], Some("sunny"), friday)
            .is_empty());

        let accepted = filter.apply(vec![destination("MIA", Some(forecast))], Some("sunny"), saturday);
        assert_eq!(accepted.len(), 1);
        assert_eq!(
            accepted[0].headline.as_ref().map(|e| e.description.as_str()),
            Some("sunny")
        );
    }
}
