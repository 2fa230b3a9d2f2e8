//! Mapping raw failures onto what the user is told and whether a retry is offered.

use std::fmt;

pub const CONNECTIVITY_MESSAGE: &str =
    "Can't connect to the internet. Please check your connection and try again.";
pub const INVALID_ZIP_MESSAGE: &str = "We couldn't find that zip code. Please check and try again.";
pub const LOOKUP_TROUBLE_MESSAGE: &str =
    "Having trouble finding that location. Please try a different zip code.";
pub const DATA_UNAVAILABLE_MESSAGE: &str =
    "Weather data is not available for this location right now.";
pub const SERVICE_BUSY_MESSAGE: &str =
    "The weather service is temporarily busy. Please try again in a moment.";
pub const SLOW_REQUEST_MESSAGE: &str = "The request is taking too long. Please try again.";
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// A failure ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub message: String,
    pub retryable: bool,
}

impl ClassifiedError {
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self { message: message.into(), retryable }
    }

    /// Classify a failure from its message text. First matching rule wins.
    pub fn from_message(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        let has = |needle: &str| lower.contains(needle);

        if has("network") || has("connection") {
            return Self::new(CONNECTIVITY_MESSAGE, true);
        }
        if has("location not found") || has("invalid zip") {
            return Self::new(INVALID_ZIP_MESSAGE, false);
        }
        if has("geocoding") {
            return Self::new(LOOKUP_TROUBLE_MESSAGE, false);
        }
        if has("weather data not available") {
            return Self::new(DATA_UNAVAILABLE_MESSAGE, false);
        }
        if has("temporarily unavailable") {
            return Self::new(SERVICE_BUSY_MESSAGE, true);
        }
        if has("timeout") {
            return Self::new(SLOW_REQUEST_MESSAGE, true);
        }
        if !has("failed") && !has("error") {
            let retryable = has("network") || has("timeout") || has("temporarily") || has("busy");
            return Self::new(raw, retryable);
        }
        Self::new(GENERIC_MESSAGE, true)
    }

    /// Classify any error value by its rendered message.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::from_message(&err.to_string())
    }

    /// Used when the failure is not an error value at all, e.g. a panicked task.
    pub fn unrecognized() -> Self {
        Self::new(GENERIC_MESSAGE, true)
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
