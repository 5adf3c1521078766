//! Location Resolution Module
//!
//! Maps the free-text departure location to a provider location code, and
//! location codes to coordinates for candidates that arrived without them.
//! No match and transport errors resolve to `None`. A rejected token is the
//! only lookup failure that ends the run.

use tracing::{debug, warn};

use crate::GetawayError;
use crate::auth::AccessToken;
use crate::models::Coordinates;
use crate::travel::TravelDataProvider;

/// Service for resolving locations against the travel data provider
pub struct LocationResolver;

impl LocationResolver {
    /// Location code of the first city matching `location`
    pub async fn resolve_location_code<P: TravelDataProvider + ?Sized>(
        provider: &P,
        token: &AccessToken,
        location: &str,
    ) -> crate::Result<Option<String>> {
        debug!("Resolving location code for: {}", location);

        match provider.city_code(token, location).await {
            Ok(Some(code)) => {
                debug!("Resolved {} to {}", location, code);
                Ok(Some(code))
            }
            Ok(None) => {
                debug!("No city matches {}", location);
                Ok(None)
            }
            Err(e @ GetawayError::Credential { .. }) => Err(e),
            Err(e) => {
                warn!("Location lookup for {} failed: {}", location, e);
                Ok(None)
            }
        }
    }

    /// Coordinates of the first city matching `code`
    pub async fn resolve_coordinates<P: TravelDataProvider + ?Sized>(
        provider: &P,
        token: &AccessToken,
        code: &str,
    ) -> Option<Coordinates> {
        match provider.city_coordinates(token, code).await {
            Ok(Some(coordinates)) => {
                debug!(
                    "Resolved {} to ({:.4}, {:.4})",
                    code, coordinates.latitude, coordinates.longitude
                );
                Some(coordinates)
            }
            Ok(None) => {
                debug!("No geo data for {}", code);
                None
            }
            Err(e) => {
                warn!("Coordinate lookup for {} failed: {}", code, e);
                None
            }
        }
    }
}
