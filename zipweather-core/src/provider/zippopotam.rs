use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::{ApiError, ErrorCode, LookupError},
    http::HttpClient,
    model::{Coordinates, GeocodeResult, format_location_name},
};

use super::Geocoder;

pub const DEFAULT_BASE_URL: &str = "https://api.zippopotam.us";

/// Free ZIP-to-coordinates service. Unknown ZIP codes come back as 404.
#[derive(Debug, Clone)]
pub struct ZippopotamGeocoder {
    base_url: String,
    http: HttpClient,
}

impl ZippopotamGeocoder {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }

    async fn lookup(&self, zip: &str) -> Result<GeocodeResult, ApiError> {
        let url = format!("{}/us/{}", self.base_url.trim_end_matches('/'), zip);
        let parsed: ZpResponse = self.http.get_json(&url).await?;

        let place = parsed
            .places
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::new(ErrorCode::Unknown, "Zip code not found or invalid"))?;

        let latitude = parse_degrees(&place.latitude)?;
        let longitude = parse_degrees(&place.longitude)?;

        let city = Some(place.place_name).filter(|s| !s.is_empty());
        let state = Some(place.state_abbreviation).filter(|s| !s.is_empty());
        let display_name = format_location_name(city.as_deref(), state.as_deref());

        Ok(GeocodeResult {
            coordinates: Coordinates { latitude, longitude, display_name: display_name.clone() },
            address: format!("{display_name} {}", parsed.post_code),
            city,
            state,
            zip_code: parsed.post_code,
        })
    }
}

fn parse_degrees(raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::unexpected().with_details(format!("bad coordinate '{raw}'")))
}

#[derive(Debug, Deserialize)]
struct ZpPlace {
    #[serde(rename = "place name")]
    place_name: String,
    #[serde(rename = "state abbreviation", default)]
    state_abbreviation: String,
    latitude: String,
    longitude: String,
}

#[derive(Debug, Deserialize)]
struct ZpResponse {
    #[serde(rename = "post code")]
    post_code: String,
    #[serde(default)]
    places: Vec<ZpPlace>,
}

#[async_trait]
impl Geocoder for ZippopotamGeocoder {
    async fn resolve_zip(&self, zip: &str) -> Result<GeocodeResult, LookupError> {
        self.lookup(zip).await.map_err(|err| {
            tracing::warn!(zip, code = %err.code, error = %err, "zippopotam geocode failed");
            LookupError::from_geocoding(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolves_string_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/us/90210"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "post code": "90210",
                "country": "United States",
                "places": [{
                    "place name": "Beverly Hills",
                    "longitude": "-118.4065",
                    "state": "California",
                    "state abbreviation": "CA",
                    "latitude": "34.0901"
                }]
            })))
            .mount(&server)
            .await;

        let geocoder = ZippopotamGeocoder::new(HttpClient::new().unwrap(), server.uri());
        let found = geocoder.resolve_zip("90210").await.unwrap();

        assert_eq!(found.coordinates.latitude, 34.0901);
        assert_eq!(found.coordinates.longitude, -118.4065);
        assert_eq!(found.coordinates.display_name, "Beverly Hills, CA");
        assert_eq!(found.city.as_deref(), Some("Beverly Hills"));
        assert_eq!(found.zip_code, "90210");
    }

    #[tokio::test]
    async fn unknown_zip_is_location_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let geocoder = ZippopotamGeocoder::new(HttpClient::new().unwrap(), server.uri());
        let err = geocoder.resolve_zip("99999").await.unwrap_err();
        assert_eq!(err.to_string(), "Location not found for this zip code");
    }

    #[tokio::test]
    async fn garbled_coordinates_are_geocoding_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "post code": "12345",
                "places": [{
                    "place name": "Schenectady",
                    "state abbreviation": "NY",
                    "longitude": "west-ish",
                    "latitude": "42.8"
                }]
            })))
            .mount(&server)
            .await;

        let geocoder = ZippopotamGeocoder::new(HttpClient::new().unwrap(), server.uri());
        let err = geocoder.resolve_zip("12345").await.unwrap_err();
        assert_eq!(err.to_string(), "Geocoding failed: An unexpected error occurred");
    }
}
