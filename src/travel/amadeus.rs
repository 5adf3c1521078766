use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{FlightSearch, TravelDataProvider};
use crate::auth::AccessToken;
use crate::config::{AmadeusConfig, SearchConfig};
use crate::models::{Attraction, Coordinates, DestinationCandidate, LodgingOffer};
use crate::{GetawayError, Result};

/// HTTP client for the Amadeus self-service APIs
pub struct AmadeusClient {
    client: Client,
    base_url: String,
    currency: String,
    hotel_radius_km: u32,
    poi_radius_km: u32,
}

impl AmadeusClient {
    pub fn new(config: &AmadeusConfig, search: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("getaway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GetawayError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            hotel_radius_km: search.hotel_radius_km,
            poi_radius_km: search.poi_radius_km,
        })
    }

    /// GET `path` with the bearer token and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, token: &AccessToken, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);
        let start_time = Instant::now();

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| GetawayError::api(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("{} returned {}: {}", path, status, error_text);

            return Err(match status.as_u16() {
                401 => GetawayError::credential("Access token was rejected by the provider"),
                code => GetawayError::api_status(format!("{path} returned {status}"), code),
            });
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| GetawayError::api(format!("Invalid response from {path}: {e}")))?;

        debug!(
            "GET {} completed in {:.3}s",
            path,
            start_time.elapsed().as_secs_f64()
        );
        Ok(body)
    }
}

#[async_trait]
impl TravelDataProvider for AmadeusClient {
    #[instrument(skip(self, token))]
    async fn city_code(&self, token: &AccessToken, keyword: &str) -> Result<Option<String>> {
        let path = format!(
            "/v1/reference-data/locations/cities?keyword={}",
            urlencoding::encode(keyword)
        );
        let response: api::Envelope<api::CityLocation> = self.get_json(token, &path).await?;

        Ok(response
            .into_data()
            .into_iter()
            .next()
            .and_then(|city| city.iata_code))
    }

    #[instrument(skip(self, token))]
    async fn city_coordinates(
        &self,
        token: &AccessToken,
        code: &str,
    ) -> Result<Option<Coordinates>> {
        let path = format!(
            "/v1/reference-data/locations?subType=CITY&keyword={}",
            urlencoding::encode(code)
        );
        let response: api::Envelope<api::CityLocation> = self.get_json(token, &path).await?;

        Ok(response
            .into_data()
            .into_iter()
            .next()
            .and_then(|city| city.geo_code)
            .map(Coordinates::from))
    }

    #[instrument(skip(self, token))]
    async fn flight_destinations(
        &self,
        token: &AccessToken,
        search: &FlightSearch,
    ) -> Result<Vec<DestinationCandidate>> {
        let mut path = format!(
            "/v1/shopping/flight-destinations?origin={}&maxPrice={}",
            urlencoding::encode(&search.origin),
            search.max_price
        );
        if let Some(date) = search.departure_date {
            path.push_str(&format!("&departureDate={}", date.format("%Y-%m-%d")));
        }

        let response: api::Envelope<api::FlightDestination> = self.get_json(token, &path).await?;
        let Some(destinations) = response.data else {
            return Err(GetawayError::api("Flight destination response has no data"));
        };

        info!(
            "Found {} destinations from {} under {}",
            destinations.len(),
            search.origin,
            search.max_price
        );
        Ok(destinations
            .into_iter()
            .map(DestinationCandidate::from)
            .collect())
    }

    #[instrument(skip(self, token))]
    async fn points_of_interest(
        &self,
        token: &AccessToken,
        near: Coordinates,
        category: Option<&str>,
    ) -> Result<Vec<Attraction>> {
        let mut path = format!(
            "/v1/reference-data/locations/pois?latitude={}&longitude={}&radius={}",
            near.latitude, near.longitude, self.poi_radius_km
        );
        if let Some(category) = category {
            path.push_str(&format!("&categories={}", urlencoding::encode(category)));
        }

        let response: api::Envelope<api::PointOfInterest> = self.get_json(token, &path).await?;
        Ok(response
            .into_data()
            .into_iter()
            .map(Attraction::from)
            .collect())
    }

    #[instrument(skip(self, token))]
    async fn hotel_offers(
        &self,
        token: &AccessToken,
        city_code: &str,
        max_price: f64,
    ) -> Result<Vec<LodgingOffer>> {
        let path = format!(
            "/v2/shopping/hotel-offers?cityCode={}&radius={}&radiusUnit=KM&priceRange=-{}&currency={}",
            urlencoding::encode(city_code),
            self.hotel_radius_km,
            max_price.floor().max(0.0),
            urlencoding::encode(&self.currency)
        );

        let response: api::Envelope<api::HotelOffers> = self.get_json(token, &path).await?;
        Ok(response
            .into_data()
            .into_iter()
            .filter_map(api::HotelOffers::into_lodging)
            .collect())
    }
}

/// Amadeus response structures and conversion utilities
mod api {
    use super::{Attraction, Coordinates, DestinationCandidate, LodgingOffer};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, de};

    #[derive(Debug, Deserialize)]
    pub struct Envelope<T> {
        pub data: Option<Vec<T>>,
    }

    impl<T> Envelope<T> {
        pub fn into_data(self) -> Vec<T> {
            self.data.unwrap_or_default()
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CityLocation {
        pub iata_code: Option<String>,
        pub geo_code: Option<GeoCode>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeoCode {
        pub latitude: f64,
        pub longitude: f64,
    }

    impl From<GeoCode> for Coordinates {
        fn from(geo: GeoCode) -> Self {
            Coordinates {
                latitude: geo.latitude,
                longitude: geo.longitude,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FlightDestination {
        pub destination: String,
        pub departure_date: Option<NaiveDate>,
        pub return_date: Option<NaiveDate>,
        pub price: Price,
        pub country: Option<String>,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
    }

    impl From<FlightDestination> for DestinationCandidate {
        fn from(flight: FlightDestination) -> Self {
            let coordinates = match (flight.latitude, flight.longitude) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            };

            DestinationCandidate {
                code: flight.destination,
                country: flight.country,
                flight_price: flight.price.total,
                departure_date: flight.departure_date,
                return_date: flight.return_date,
                coordinates,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct Price {
        #[serde(deserialize_with = "amount")]
        pub total: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct PointOfInterest {
        pub name: String,
        pub category: Option<String>,
    }

    impl From<PointOfInterest> for Attraction {
        fn from(poi: PointOfInterest) -> Self {
            Attraction {
                name: poi.name,
                category: poi.category,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct HotelOffers {
        pub hotel: Hotel,
        #[serde(default)]
        pub offers: Vec<Offer>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Hotel {
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Offer {
        pub price: Price,
    }

    impl HotelOffers {
        /// Cheapest offer of the hotel, `None` without offers
        pub fn into_lodging(self) -> Option<LodgingOffer> {
            let price = self
                .offers
                .iter()
                .map(|offer| offer.price.total)
                .min_by(f64::total_cmp)?;

            Some(LodgingOffer {
                name: self.hotel.name,
                price,
            })
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    /// Prices arrive as decimal strings ("123.45") or plain numbers
    fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Amount::deserialize(deserializer)? {
            Amount::Number(value) => Ok(value),
            Amount::Text(text) => text.trim().parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    async fn client_for(server: &ServerGuard) -> AmadeusClient {
        let config = AmadeusConfig {
            base_url: server.url(),
            ..AmadeusConfig::default()
        };
        AmadeusClient::new(&config, &SearchConfig::default()).unwrap()
    }

    fn token() -> AccessToken {
        AccessToken::new("test-token")
    }

    #[tokio::test]
    async fn test_city_code_takes_first_match() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/reference-data/locations/cities")
            .match_query(Matcher::UrlEncoded("keyword".into(), "New York".into()))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"name":"NEW YORK","iataCode":"NYC"},{"name":"NEW YORK MILLS","iataCode":"UTM"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let code = client.city_code(&token(), "New York").await.unwrap();
        assert_eq!(code.as_deref(), Some("NYC"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_city_code_no_match() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/reference-data/locations/cities")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"meta":{"count":0},"data":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.city_code(&token(), "Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_city_coordinates_missing_geo_code() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/reference-data/locations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("subType".into(), "CITY".into()),
                Matcher::UrlEncoded("keyword".into(), "SJU".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"name":"SAN JUAN"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.city_coordinates(&token(), "SJU").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flight_destinations() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/shopping/flight-destinations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("origin".into(), "CHI".into()),
                Matcher::UrlEncoded("maxPrice".into(), "240".into()),
                Matcher::UrlEncoded("departureDate".into(), "2024-06-14".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[
                    {"type":"flight-destination","origin":"CHI","destination":"MIA","departureDate":"2024-06-14","returnDate":"2024-06-16","price":{"total":"189.40"}},
                    {"type":"flight-destination","origin":"CHI","destination":"LAS","price":{"total":230},"latitude":36.08,"longitude":-115.15,"country":"US"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server).await;
        let search = FlightSearch {
            origin: "CHI".to_string(),
            max_price: 240,
            departure_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 14),
        };
        let destinations = client.flight_destinations(&token(), &search).await.unwrap();

        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].code, "MIA");
        assert_eq!(destinations[0].flight_price, 189.40);
        assert!(destinations[0].coordinates.is_none());
        assert_eq!(destinations[1].code, "LAS");
        assert_eq!(destinations[1].country.as_deref(), Some("US"));
        assert_eq!(
            destinations[1].coordinates,
            Some(Coordinates {
                latitude: 36.08,
                longitude: -115.15
            })
        );

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_flight_destinations_provider_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/shopping/flight-destinations")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"errors":[{"status":500,"title":"SYSTEM ERROR HAS OCCURRED"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let search = FlightSearch {
            origin: "CHI".to_string(),
            max_price: 240,
            departure_date: None,
        };
        let result = client.flight_destinations(&token(), &search).await;
        assert!(matches!(result, Err(GetawayError::Api { status: Some(500), .. })));
    }

    #[tokio::test]
    async fn test_rejected_token_is_a_credential_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/reference-data/locations/cities")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errors":[{"code":38190,"title":"Invalid access token"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let result = client.city_code(&token(), "Chicago").await;
        assert!(matches!(result, Err(GetawayError::Credential { .. })));
    }

    #[tokio::test]
    async fn test_hotel_offers_sends_budget_and_takes_cheapest_offer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/shopping/hotel-offers")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cityCode".into(), "MIA".into()),
                Matcher::UrlEncoded("priceRange".into(), "-620".into()),
                Matcher::UrlEncoded("currency".into(), "USD".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[
                    {"hotel":{"name":"Ocean View"},"offers":[{"price":{"total":"410.00"}},{"price":{"total":"380.50"}}]},
                    {"hotel":{"name":"No Rooms Left"},"offers":[]}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server).await;
        let offers = client.hotel_offers(&token(), "MIA", 620.0).await.unwrap();
        assert_eq!(
            offers,
            vec![LodgingOffer {
                name: "Ocean View".to_string(),
                price: 380.5
            }]
        );

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_points_of_interest_with_category() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/reference-data/locations/pois")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "25.79".into()),
                Matcher::UrlEncoded("longitude".into(), "-80.13".into()),
                Matcher::UrlEncoded("categories".into(), "BEACH_PARK".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"name":"South Beach","category":"BEACH_PARK","rank":5}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let near = Coordinates {
            latitude: 25.79,
            longitude: -80.13,
        };
        let pois = client
            .points_of_interest(&token(), near, Some("BEACH_PARK"))
            .await
            .unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].name, "South Beach");

        mock.assert_async().await;
    }
}
