use crate::{
    Config,
    error::LookupError,
    http::HttpClient,
    model::{Coordinates, GeocodeResult, WeatherData},
    provider::{census::CensusGeocoder, nws::NwsForecastProvider, zippopotam::ZippopotamGeocoder},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod census;
pub mod nws;
pub mod zippopotam;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeocoderId {
    #[default]
    Census,
    Zippopotam,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::Census => "census",
            GeocoderId::Zippopotam => "zippopotam",
        }
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::Census, GeocoderId::Zippopotam]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            GeocoderId::Census => census::DEFAULT_BASE_URL,
            GeocoderId::Zippopotam => zippopotam::DEFAULT_BASE_URL,
        }
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "census" => Ok(GeocoderId::Census),
            "zippopotam" => Ok(GeocoderId::Zippopotam),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: census, zippopotam."
            )),
        }
    }
}

/// Resolves a five-digit ZIP code to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn resolve_zip(&self, zip: &str) -> Result<GeocodeResult, LookupError>;
}

/// Fetches current conditions for resolved coordinates.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(
        &self,
        coordinates: &Coordinates,
        zip: &str,
    ) -> Result<WeatherData, LookupError>;
}

/// Construct the geocoder selected in config.
pub fn geocoder_from_config(config: &Config, http: HttpClient) -> anyhow::Result<Arc<dyn Geocoder>> {
    let id = config.geocoder_id()?;
    let base_url = config.geocoder_base_url()?;

    let geocoder: Arc<dyn Geocoder> = match id {
        GeocoderId::Census => Arc::new(CensusGeocoder::new(http, base_url)),
        GeocoderId::Zippopotam => Arc::new(ZippopotamGeocoder::new(http, base_url)),
    };

    Ok(geocoder)
}

/// Construct the forecast provider, honouring the configured endpoint.
pub fn forecast_provider_from_config(config: &Config, http: HttpClient) -> Arc<dyn ForecastProvider> {
    Arc::new(NwsForecastProvider::new(http, config.weather_base_url()))
}
