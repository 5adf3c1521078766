//! Weather forecast model

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A single time-stamped forecast entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    /// Human-readable description, e.g. "scattered clouds"
    pub description: String,
    /// Temperature in the configured weather units
    pub temperature: f32,
}

impl ForecastEntry {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, description: impl Into<String>, temperature: f32) -> Self {
        Self {
            timestamp,
            description: description.into(),
            temperature,
        }
    }
}

/// Multi-entry forecast for one city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherForecast {
    /// City the forecast was requested for
    pub city: String,
    /// Offset of the city's local time from UTC
    pub utc_offset_seconds: i32,
    /// Entries sorted by timestamp
    pub entries: Vec<ForecastEntry>,
}

impl WeatherForecast {
    /// Create new forecast with entries in UTC
    #[must_use]
    pub fn new(city: impl Into<String>, entries: Vec<ForecastEntry>) -> Self {
        Self {
            city: city.into(),
            utc_offset_seconds: 0,
            entries,
        }
    }

    #[must_use]
    pub fn with_utc_offset(mut self, seconds: i32) -> Self {
        self.utc_offset_seconds = seconds;
        self
    }

    /// Local wall-clock time of an entry at the forecast city
    #[must_use]
    pub fn local_time(&self, entry: &ForecastEntry) -> NaiveDateTime {
        match FixedOffset::east_opt(self.utc_offset_seconds) {
            Some(offset) => entry.timestamp.with_timezone(&offset).naive_local(),
            None => entry.timestamp.naive_utc(),
        }
    }

    /// Entries on `date` whose local hour lies in `start_hour..=end_hour`
    #[must_use]
    pub fn entries_within(
        &self,
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
    ) -> Vec<&ForecastEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                let local = self.local_time(entry);
                local.date() == date && (start_hour..=end_hour).contains(&local.hour())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(h: u32, day: u32, description: &str) -> ForecastEntry {
        ForecastEntry::new(
            Utc.with_ymd_and_hms(2024, 6, day, h, 0, 0).unwrap(),
            description,
            72.4,
        )
    }

    #[test]
    fn test_entries_within_window() {
        let forecast = WeatherForecast::new(
            "Miami",
            vec![
                entry(3, 14, "clear sky"),
                entry(12, 14, "light rain"),
                entry(18, 14, "few clouds"),
                entry(12, 15, "sunny"),
            ],
        );

        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let window = forecast.entries_within(date, 6, 21);
        let descriptions: Vec<&str> = window.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["light rain", "few clouds"]);
    }

    #[test]
    fn test_entries_within_uses_local_time() {
        // 02:00 UTC on the 15th is 22:00 on the 14th at UTC-4
        let forecast =
            WeatherForecast::new("Miami", vec![entry(2, 15, "clear sky")]).with_utc_offset(-4 * 3600);

        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(forecast.entries_within(date, 20, 23).len(), 1);
        assert!(forecast
            .entries_within(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), 0, 23)
            .is_empty());
    }
}
