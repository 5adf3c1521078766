//! Error types and handling for the getaway recommender

use thiserror::Error;

/// Main error type for the getaway recommender
#[derive(Error, Debug)]
pub enum GetawayError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// No access token could be obtained from the auth endpoint
    #[error("Credential error: {message}")]
    Credential { message: String },

    /// The departure location could not be mapped to a location code
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    /// The destination search itself failed at the provider
    #[error("Destination search failed: {message}")]
    Search { message: String },

    /// The destination search succeeded but returned nothing affordable
    #[error("No destinations found for a maximum flight price of {max_flight_price}")]
    NoDestinations { max_flight_price: u64 },

    /// API communication errors
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl GetawayError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new credential error
    pub fn credential<S: Into<String>>(message: S) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    /// Create a new search error
    pub fn search<S: Into<String>>(message: S) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a new API error without an HTTP status
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new API error for a non-success HTTP status
    pub fn api_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GetawayError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            GetawayError::Credential { .. } => {
                "Could not authenticate with the travel data provider. Please try again later."
                    .to_string()
            }
            GetawayError::LocationNotFound { location } => {
                format!("We couldn't find an airport for '{location}'. Try a nearby major city.")
            }
            GetawayError::Search { .. } => {
                "The flight search is unavailable right now. Please try again later.".to_string()
            }
            GetawayError::NoDestinations { .. } => {
                "No destinations fit your budget. Try raising the budget per person.".to_string()
            }
            GetawayError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            GetawayError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            GetawayError::General { .. } => {
                "Something went wrong while searching for getaways.".to_string()
            }
        }
    }
}
