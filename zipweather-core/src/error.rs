use std::fmt;

/// Closed set of failure kinds produced at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    NetworkError,
    ServerError,
    Timeout,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport or status failure, normalized once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { message: message.into(), code, details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn timeout() -> Self {
        Self::new(ErrorCode::Timeout, "Request timeout - please try again")
    }

    pub fn network() -> Self {
        Self::new(ErrorCode::NetworkError, "Network error - please check your connection")
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound, "Resource not found")
    }

    pub fn server() -> Self {
        Self::new(ErrorCode::ServerError, "Service temporarily unavailable")
    }

    pub fn unexpected() -> Self {
        Self::new(ErrorCode::Unknown, "An unexpected error occurred")
    }
}

/// Failure of one of the two chained lookups, carrying the domain message
/// the classifier works from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("{0}")]
    Geocoding(String),
    #[error("{0}")]
    Weather(String),
    #[error("Lookup cancelled")]
    Cancelled,
}

impl LookupError {
    /// Re-wrap a geocoder failure into a location-themed message.
    pub fn from_geocoding(err: ApiError) -> Self {
        let message = match err.code {
            ErrorCode::NotFound => "Location not found for this zip code".to_string(),
            ErrorCode::NetworkError => "Unable to connect to geocoding service. \
                 Please check your internet connection."
                .to_string(),
            _ if err.message.contains("not found") || err.message.contains("invalid") => {
                "Invalid zip code or location not found".to_string()
            }
            _ => format!("Geocoding failed: {}", err.message),
        };
        LookupError::Geocoding(message)
    }

    /// Re-wrap a forecast failure into a weather-themed message.
    pub fn from_weather(err: ApiError) -> Self {
        let message = match err.code {
            ErrorCode::NotFound => "Weather data not available for this location".to_string(),
            ErrorCode::NetworkError => "Unable to connect to weather service. \
                 Please check your internet connection."
                .to_string(),
            ErrorCode::ServerError => {
                "Weather service is temporarily unavailable. Please try again later.".to_string()
            }
            _ => format!("Failed to fetch weather data: {}", err.message),
        };
        LookupError::Weather(message)
    }
}
