use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::{
    error::{ApiError, ErrorCode, LookupError},
    http::HttpClient,
    model::{Coordinates, GeocodeResult, format_location_name},
};

use super::Geocoder;

pub const DEFAULT_BASE_URL: &str = "https://geocoding.geo.census.gov";

/// US Census one-line address matcher, queried with the bare ZIP code.
#[derive(Debug, Clone)]
pub struct CensusGeocoder {
    base_url: String,
    http: HttpClient,
}

impl CensusGeocoder {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }

    fn lookup_url(&self, zip: &str) -> Result<Url, ApiError> {
        let endpoint = format!(
            "{}/geocoder/locations/onelineaddress",
            self.base_url.trim_end_matches('/')
        );
        Url::parse_with_params(
            &endpoint,
            &[("address", zip), ("benchmark", "2020"), ("format", "json")],
        )
        .map_err(|e| ApiError::unexpected().with_details(e.to_string()))
    }

    async fn lookup(&self, zip: &str) -> Result<GeocodeResult, ApiError> {
        let url = self.lookup_url(zip)?;
        let parsed: CensusResponse = self.http.get_json(url.as_str()).await?;

        let matched = parsed
            .result
            .address_matches
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::new(ErrorCode::Unknown, "Zip code not found or invalid"))?;

        let components = matched.address_components;
        let city = Some(components.city).filter(|s| !s.is_empty());
        let state = Some(components.state).filter(|s| !s.is_empty());

        // The census service reports x = longitude, y = latitude.
        let coordinates = Coordinates {
            latitude: matched.coordinates.y,
            longitude: matched.coordinates.x,
            display_name: format_location_name(city.as_deref(), state.as_deref()),
        };

        Ok(GeocodeResult {
            coordinates,
            address: matched.matched_address,
            city,
            state,
            zip_code: components.zip,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CensusPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct CensusAddressComponents {
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    zip: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CensusMatch {
    coordinates: CensusPoint,
    address_components: CensusAddressComponents,
    matched_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CensusResult {
    #[serde(default)]
    address_matches: Vec<CensusMatch>,
}

#[derive(Debug, Deserialize)]
struct CensusResponse {
    result: CensusResult,
}

#[async_trait]
impl Geocoder for CensusGeocoder {
    async fn resolve_zip(&self, zip: &str) -> Result<GeocodeResult, LookupError> {
        match self.lookup(zip).await {
            Ok(found) => {
                tracing::info!(zip, location = %found.coordinates.display_name, "census geocode resolved");
                Ok(found)
            }
            Err(err) => {
                tracing::warn!(zip, code = %err.code, error = %err, "census geocode failed");
                Err(LookupError::from_geocoding(err))
            }
        }
    }
}
