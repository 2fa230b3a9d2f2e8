//! Core library for the `zipweather` CLI.
//!
//! This crate defines:
//! - ZIP code validation and input normalization
//! - A timeout-bounded HTTP layer with a small error vocabulary
//! - Geocoding and forecast providers behind async traits
//! - The stage sequencer that paces progress feedback
//! - The two-step lookup pipeline and the session that drives it
//! - Classification of failures into user-facing messages
//!
//! It is used by `zipweather-cli`, but can also be reused by other front-ends.

pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod sequencer;
pub mod session;
pub mod stage;
pub mod validation;

pub use classify::ClassifiedError;
pub use config::Config;
pub use error::{ApiError, ErrorCode, LookupError};
pub use model::{Coordinates, GeocodeResult, WeatherData};
pub use pipeline::WeatherPipeline;
pub use provider::{ForecastProvider, Geocoder, GeocoderId};
pub use sequencer::{MIN_STAGE_DURATION, StageEvent, StageHandle, StageSequencer};
pub use session::WeatherSession;
pub use stage::{Stage, StageBoard, StageMark};
pub use validation::{is_valid_zip, normalize_zip_input, zip_error_message};
