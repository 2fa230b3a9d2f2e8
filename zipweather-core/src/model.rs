use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// A ZIP code resolved by a geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: String,
}

/// Current conditions for one location, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub location: String,
    pub zip_code: String,
    pub temperature: f64,
    pub temperature_unit: String,
    pub conditions: String,
    pub humidity: f64,
    /// Miles per hour, parsed from the provider's free-text value.
    pub wind_speed: u32,
    pub wind_direction: String,
    pub feels_like: f64,
    pub timestamp: DateTime<Utc>,
}

/// "City, ST" when both parts are known, otherwise whichever one is.
pub fn format_location_name(city: Option<&str>, state: Option<&str>) -> String {
    let city = city.filter(|s| !s.is_empty());
    let state = state.filter(|s| !s.is_empty());
    match (city, state) {
        (Some(c), Some(s)) => format!("{c}, {s}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => "Unknown Location".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_name_variants() {
        assert_eq!(format_location_name(Some("New York"), Some("NY")), "New York, NY");
        assert_eq!(format_location_name(Some("Austin"), None), "Austin");
        assert_eq!(format_location_name(Some(""), Some("TX")), "TX");
        assert_eq!(format_location_name(None, None), "Unknown Location");
    }
}
