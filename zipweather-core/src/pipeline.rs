use std::sync::Arc;

use anyhow::Context;

use crate::{
    Config,
    error::LookupError,
    http::HttpClient,
    model::WeatherData,
    provider::{ForecastProvider, Geocoder, forecast_provider_from_config, geocoder_from_config},
    sequencer::StageSequencer,
    stage::Stage,
};

/// Geocode, then forecast, with each step announced through the sequencer.
///
/// A step only starts once the previous one has succeeded *and* its stage
/// has actually been shown, so progress on screen never runs ahead of the
/// requests by more than one minimum stage duration.
#[derive(Debug, Clone)]
pub struct WeatherPipeline {
    geocoder: Arc<dyn Geocoder>,
    forecaster: Arc<dyn ForecastProvider>,
    sequencer: StageSequencer,
}

impl WeatherPipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecaster: Arc<dyn ForecastProvider>,
        sequencer: StageSequencer,
    ) -> Self {
        Self { geocoder, forecaster, sequencer }
    }

    /// Build the providers named in `config` around one shared HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = HttpClient::new().context("Failed to build HTTP client")?;
        let geocoder = geocoder_from_config(config, http.clone())?;
        let forecaster = forecast_provider_from_config(config, http);
        Ok(Self::new(geocoder, forecaster, StageSequencer::new()))
    }

    pub fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }

    pub async fn fetch_weather(&self, zip: &str) -> Result<WeatherData, LookupError> {
        self.advance(Stage::Geocoding).await?;
        let place = self.geocoder.resolve_zip(zip).await?;

        self.advance(Stage::Weather).await?;
        let weather = self.forecaster.forecast(&place.coordinates, zip).await?;

        self.advance(Stage::Complete).await?;
        Ok(weather)
    }

    async fn advance(&self, stage: Stage) -> Result<(), LookupError> {
        match self.sequencer.request_stage(stage).await {
            Some(_) => Ok(()),
            None => {
                tracing::debug!(%stage, "sequence reset while waiting for stage");
                Err(LookupError::Cancelled)
            }
        }
    }
}
