//! Search criteria and the budgets derived from them

use crate::{GetawayError, Result};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Total trip budget for a group
#[must_use]
pub fn total_budget(travelers: u32, budget_per_traveler: f64) -> f64 {
    f64::from(travelers) * budget_per_traveler
}

/// Weekend day the trip starts on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DepartureDay {
    #[default]
    #[serde(alias = "friday")]
    Friday,
    #[serde(alias = "saturday")]
    Saturday,
}

impl DepartureDay {
    fn weekday(self) -> Weekday {
        match self {
            DepartureDay::Friday => Weekday::Fri,
            DepartureDay::Saturday => Weekday::Sat,
        }
    }

    /// Hour of the day the earliest departure is scheduled at
    #[must_use]
    pub fn departure_hour(self) -> u32 {
        match self {
            DepartureDay::Friday => 17,
            DepartureDay::Saturday => 5,
        }
    }

    /// Earliest departure on the upcoming departure day.
    ///
    /// Friday trips leave after work (17:00), Saturday trips early morning
    /// (05:00). When `now` already is that weekday and the departure hour
    /// has been reached, the following week is used.
    #[must_use]
    pub fn earliest_departure(self, now: NaiveDateTime) -> NaiveDateTime {
        let today = i64::from(now.weekday().num_days_from_sunday());
        let target = i64::from(self.weekday().num_days_from_sunday());

        let mut days_until = (target - today + 7) % 7;
        if days_until == 0 && now.hour() >= self.departure_hour() {
            days_until = 7;
        }

        let date = now.date() + Duration::days(days_until);
        let time = NaiveTime::from_hms_opt(self.departure_hour(), 0, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }
}

impl fmt::Display for DepartureDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartureDay::Friday => f.write_str("Friday"),
            DepartureDay::Saturday => f.write_str("Saturday"),
        }
    }
}

impl FromStr for DepartureDay {
    type Err = GetawayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "friday" => Ok(DepartureDay::Friday),
            "saturday" => Ok(DepartureDay::Saturday),
            other => Err(GetawayError::validation(format!(
                "Departure day must be Friday or Saturday, got '{other}'"
            ))),
        }
    }
}

/// Activity the travelers are after
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Activity {
    /// No preference
    #[default]
    Any,
    Beach,
    Hiking,
    City,
    /// Free text, passed to the provider as a category
    Other(String),
}

impl Activity {
    /// Points of interest category for the provider, `None` for all categories
    #[must_use]
    pub fn category(&self) -> Option<String> {
        match self {
            Activity::Any => None,
            Activity::Beach | Activity::Hiking => Some("BEACH_PARK".to_string()),
            Activity::City => Some("SIGHTS".to_string()),
            Activity::Other(text) => Some(text.trim().to_uppercase().replace(' ', "_")),
        }
    }
}

impl From<String> for Activity {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Activity::Any,
            "beach" => Activity::Beach,
            "hiking" => Activity::Hiking,
            "city" => Activity::City,
            _ => Activity::Other(value.trim().to_string()),
        }
    }
}

impl From<Activity> for String {
    fn from(value: Activity) -> Self {
        match value {
            Activity::Any => String::new(),
            Activity::Beach => "beach".to_string(),
            Activity::Hiking => "hiking".to_string(),
            Activity::City => "city".to_string(),
            Activity::Other(text) => text,
        }
    }
}

/// Everything the traveler asked for in one search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCriteria {
    pub departure_location: String,
    pub departure_day: DepartureDay,
    pub travelers: u32,
    pub budget_per_traveler: f64,
    pub activity: Activity,
    /// Matched as a case-insensitive substring of forecast descriptions
    pub weather_preference: Option<String>,
}

impl SearchCriteria {
    /// Build criteria from raw form values.
    ///
    /// Travelers and per-traveler budget below 1 are raised to 1, a blank
    /// weather preference means "no preference".
    pub fn new(
        departure_location: impl Into<String>,
        departure_day: DepartureDay,
        travelers: u32,
        budget_per_traveler: f64,
        activity: Activity,
        weather_preference: Option<String>,
    ) -> Result<Self> {
        let departure_location = departure_location.into().trim().to_string();
        if departure_location.is_empty() {
            return Err(GetawayError::validation("Departure location cannot be empty"));
        }

        if !budget_per_traveler.is_finite() {
            return Err(GetawayError::validation("Budget per person must be a number"));
        }

        let travelers = if travelers < 1 {
            debug!("Raising traveler count {} to 1", travelers);
            1
        } else {
            travelers
        };

        let budget_per_traveler = if budget_per_traveler < 1.0 {
            debug!("Raising budget per traveler {} to 1", budget_per_traveler);
            1.0
        } else {
            budget_per_traveler
        };

        let weather_preference = weather_preference
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            departure_location,
            departure_day,
            travelers,
            budget_per_traveler,
            activity,
            weather_preference,
        })
    }

    /// Total budget, always derived from travelers and per-traveler budget
    #[must_use]
    pub fn total_budget(&self) -> f64 {
        total_budget(self.travelers, self.budget_per_traveler)
    }

    /// Maximum flight price handed to the destination search
    #[must_use]
    pub fn max_flight_price(&self, flight_budget_ratio: f64) -> u64 {
        // float to int casts saturate, negative values become 0
        (self.total_budget() * flight_budget_ratio).floor() as u64
    }

    /// What is left for lodging once the flight is paid
    #[must_use]
    pub fn lodging_budget(&self, flight_price: f64) -> f64 {
        self.total_budget() - flight_price
    }
}
