//! Current conditions from the US National Weather Service.
//!
//! Two requests per lookup:
//! - `/points/<lat>,<lon>` returns `.properties.forecast`, the forecast URL
//!   for the grid cell containing the point
//! - that URL returns `.properties.periods[]`; the first period is "now"

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::{ApiError, ErrorCode, LookupError},
    http::HttpClient,
    model::{Coordinates, WeatherData},
};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// Humidity assumed by [`feels_like`] when the forecast omits it.
const FALLBACK_HUMIDITY: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct NwsForecastProvider {
    base_url: String,
    http: HttpClient,
}

impl NwsForecastProvider {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }

    async fn fetch(&self, coordinates: &Coordinates, zip: &str) -> Result<WeatherData, ApiError> {
        let points_url = format!(
            "{}/points/{:.4},{:.4}",
            self.base_url.trim_end_matches('/'),
            coordinates.latitude,
            coordinates.longitude
        );
        let points: NwsPointsResponse = self.http.get_json(&points_url).await?;

        let forecast: NwsForecastResponse =
            self.http.get_json(&points.properties.forecast).await?;

        let period = forecast
            .properties
            .periods
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::new(ErrorCode::Unknown, "No weather data available"))?;

        let wind_speed = parse_wind_speed(&period.wind_speed);

        // A reported humidity of zero is treated the same as a missing one.
        let reported_humidity = period
            .relative_humidity
            .and_then(|h| h.value)
            .filter(|v| *v != 0.0);

        let feels_like = feels_like(
            period.temperature,
            wind_speed,
            reported_humidity.unwrap_or(FALLBACK_HUMIDITY),
        );

        Ok(WeatherData {
            location: coordinates.display_name.clone(),
            zip_code: zip.to_string(),
            temperature: period.temperature,
            temperature_unit: period.temperature_unit,
            conditions: period.short_forecast,
            humidity: reported_humidity.unwrap_or(0.0),
            wind_speed,
            wind_direction: period.wind_direction,
            feels_like,
            timestamp: Utc::now(),
        })
    }
}

/// Parse "10 mph" or "5 to 10 mph" into whole miles per hour.
///
/// Ranges are averaged and rounded; text without digits yields 0.
pub fn parse_wind_speed(raw: &str) -> u32 {
    let numbers: Vec<u64> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse().ok())
        .collect();

    match numbers.as_slice() {
        [] => 0,
        [single] => u32::try_from(*single).unwrap_or(u32::MAX),
        many => {
            let mean = many.iter().sum::<u64>() as f64 / many.len() as f64;
            round_half_up(mean) as u32
        }
    }
}

/// Apparent temperature in °F using simplified wind chill and heat index rules.
pub fn feels_like(temperature: f64, wind_speed: u32, humidity: f64) -> f64 {
    let wind = f64::from(wind_speed);

    if temperature <= 50.0 && wind > 3.0 {
        let v = wind.powf(0.16);
        let chill = 35.74 + 0.6215 * temperature - 35.75 * v + 0.4275 * temperature * v;
        return round_half_up(chill);
    }

    if temperature >= 80.0 && humidity > 40.0 {
        return round_half_up(temperature + 0.05 * (humidity - 50.0));
    }

    temperature
}

/// Halves round towards positive infinity, so -2.5 becomes -2.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[derive(Debug, Deserialize)]
struct NwsPointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct NwsPointsResponse {
    properties: NwsPointsProperties,
}

#[derive(Debug, Deserialize)]
struct NwsQuantity {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPeriod {
    temperature: f64,
    temperature_unit: String,
    wind_speed: String,
    wind_direction: String,
    short_forecast: String,
    relative_humidity: Option<NwsQuantity>,
}

#[derive(Debug, Deserialize)]
struct NwsForecastProperties {
    periods: Vec<NwsPeriod>,
}

#[derive(Debug, Deserialize)]
struct NwsForecastResponse {
    properties: NwsForecastProperties,
}

#[async_trait]
impl ForecastProvider for NwsForecastProvider {
    async fn forecast(
        &self,
        coordinates: &Coordinates,
        zip: &str,
    ) -> Result<WeatherData, LookupError> {
        match self.fetch(coordinates, zip).await {
            Ok(weather) => {
                tracing::info!(
                    zip,
                    temperature = weather.temperature,
                    conditions = %weather.conditions,
                    "forecast fetched"
                );
                Ok(weather)
            }
            Err(err) => {
                tracing::warn!(zip, code = %err.code, error = %err, "forecast fetch failed");
                Err(LookupError::from_weather(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn new_york() -> Coordinates {
        Coordinates {
            latitude: 40.7484,
            longitude: -73.9857,
            display_name: "New York, NY".into(),
        }
    }

    async fn mount_points(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/points/40.7484,-73.9857"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {
                    "forecast": format!("{}/gridpoints/OKX/32,34/forecast", server.uri()),
                    "forecastGridData": format!("{}/gridpoints/OKX/32,34", server.uri())
                }
            })))
            .mount(server)
            .await;
    }

    async fn mount_forecast(server: &MockServer, periods: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/gridpoints/OKX/32,34/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "properties": { "periods": periods } })),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn wind_speed_single_value() {
        assert_eq!(parse_wind_speed("10 mph"), 10);
    }

    #[test]
    fn wind_speed_range_is_rounded_mean() {
        assert_eq!(parse_wind_speed("5 to 10 mph"), 8);
        assert_eq!(parse_wind_speed("10 to 20 mph"), 15);
    }

    #[test]
    fn wind_speed_without_digits_is_zero() {
        assert_eq!(parse_wind_speed("calm"), 0);
        assert_eq!(parse_wind_speed(""), 0);
    }

    #[test]
    fn feels_like_applies_wind_chill() {
        // 35.74 + 18.645 - 35.75 * 10^0.16 + 12.825 * 10^0.16 ≈ 21.25
        assert_eq!(feels_like(30.0, 10, 50.0), 21.0);
    }

    #[test]
    fn feels_like_applies_heat_index() {
        assert_eq!(feels_like(90.0, 5, 60.0), 91.0);
        assert_eq!(feels_like(85.0, 5, 70.0), 86.0);
    }

    #[test]
    fn feels_like_passes_through_mild_weather() {
        assert_eq!(feels_like(65.0, 5, 50.0), 65.0);
        // Cold but calm.
        assert_eq!(feels_like(40.0, 3, 50.0), 40.0);
        // Hot but dry.
        assert_eq!(feels_like(95.0, 5, 30.0), 95.0);
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(7.5), 8.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[tokio::test]
    async fn fetches_points_then_forecast() {
        let server = MockServer::start().await;
        mount_points(&server).await;
        mount_forecast(
            &server,
            serde_json::json!([{
                "temperature": 72,
                "temperatureUnit": "F",
                "windSpeed": "10 mph",
                "windDirection": "NW",
                "shortForecast": "Partly Cloudy",
                "detailedForecast": "Partly cloudy with a high of 72.",
                "relativeHumidity": { "value": 65 }
            }]),
        )
        .await;

        let provider = NwsForecastProvider::new(HttpClient::new().unwrap(), server.uri());
        let weather = provider.forecast(&new_york(), "10001").await.unwrap();

        assert_eq!(weather.location, "New York, NY");
        assert_eq!(weather.zip_code, "10001");
        assert_eq!(weather.temperature, 72.0);
        assert_eq!(weather.temperature_unit, "F");
        assert_eq!(weather.conditions, "Partly Cloudy");
        assert_eq!(weather.humidity, 65.0);
        assert_eq!(weather.wind_speed, 10);
        assert_eq!(weather.wind_direction, "NW");
        assert_eq!(weather.feels_like, 72.0);
    }

    #[tokio::test]
    async fn missing_humidity_shows_zero_but_computes_with_fifty() {
        let server = MockServer::start().await;
        mount_points(&server).await;
        mount_forecast(
            &server,
            serde_json::json!([{
                "temperature": 90,
                "temperatureUnit": "F",
                "windSpeed": "5 to 10 mph",
                "windDirection": "S",
                "shortForecast": "Sunny",
                "relativeHumidity": { "value": null }
            }]),
        )
        .await;

        let provider = NwsForecastProvider::new(HttpClient::new().unwrap(), server.uri());
        let weather = provider.forecast(&new_york(), "10001").await.unwrap();

        assert_eq!(weather.humidity, 0.0);
        assert_eq!(weather.wind_speed, 8);
        // 90 + 0.05 * (50 - 50)
        assert_eq!(weather.feels_like, 90.0);
    }

    #[tokio::test]
    async fn empty_periods_is_weather_failure() {
        let server = MockServer::start().await;
        mount_points(&server).await;
        mount_forecast(&server, serde_json::json!([])).await;

        let provider = NwsForecastProvider::new(HttpClient::new().unwrap(), server.uri());
        let err = provider.forecast(&new_york(), "10001").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch weather data: No weather data available"
        );
    }

    #[tokio::test]
    async fn points_404_is_weather_not_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = NwsForecastProvider::new(HttpClient::new().unwrap(), server.uri());
        let err = provider.forecast(&new_york(), "10001").await.unwrap_err();
        assert_eq!(err, LookupError::Weather("Weather data not available for this location".into()));
    }

    #[tokio::test]
    async fn forecast_500_is_temporarily_unavailable() {
        let server = MockServer::start().await;
        mount_points(&server).await;
        Mock::given(method("GET"))
            .and(path("/gridpoints/OKX/32,34/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = NwsForecastProvider::new(HttpClient::new().unwrap(), server.uri());
        let err = provider.forecast(&new_york(), "10001").await.unwrap_err();
        assert!(err.to_string().contains("temporarily unavailable"));
    }
}
