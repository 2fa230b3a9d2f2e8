use crate::{
    classify::ClassifiedError,
    model::WeatherData,
    pipeline::WeatherPipeline,
    sequencer::StageSequencer,
    validation::{is_valid_zip, zip_error_message},
};

/// One interactive session: owns the pipeline and remembers the last ZIP
/// submitted so a failed lookup can be retried from scratch.
#[derive(Debug)]
pub struct WeatherSession {
    pipeline: WeatherPipeline,
    last_zip: Option<String>,
}

impl WeatherSession {
    pub fn new(pipeline: WeatherPipeline) -> Self {
        Self { pipeline, last_zip: None }
    }

    pub fn sequencer(&self) -> &StageSequencer {
        self.pipeline.sequencer()
    }

    pub fn last_zip(&self) -> Option<&str> {
        self.last_zip.as_deref()
    }

    /// Validate and look up `zip`. Invalid input never reaches the network.
    pub async fn submit(&mut self, zip: &str) -> Result<WeatherData, ClassifiedError> {
        if !is_valid_zip(zip) {
            return Err(ClassifiedError::new(zip_error_message(zip), false));
        }
        self.last_zip = Some(zip.to_string());
        self.run(zip.to_string()).await
    }

    /// Run the whole lookup again for the last submitted ZIP.
    pub async fn retry(&mut self) -> Result<WeatherData, ClassifiedError> {
        match self.last_zip.clone() {
            Some(zip) => self.run(zip).await,
            None => Err(ClassifiedError::new(zip_error_message(""), false)),
        }
    }

    async fn run(&self, zip: String) -> Result<WeatherData, ClassifiedError> {
        let sequencer = self.pipeline.sequencer();
        sequencer.show();

        // Run on its own task so a panicking provider still leaves the
        // session usable.
        let pipeline = self.pipeline.clone();
        let task = tokio::spawn(async move { pipeline.fetch_weather(&zip).await });

        let classified = match task.await {
            Ok(Ok(weather)) => {
                sequencer.hide();
                return Ok(weather);
            }
            Ok(Err(err)) => {
                let classified = ClassifiedError::from_error(&err);
                tracing::warn!(error = %err, retryable = classified.retryable, "lookup failed");
                classified
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "lookup task did not finish");
                ClassifiedError::unrecognized()
            }
        };

        sequencer.hide();
        sequencer.reset();
        Err(classified)
    }
}
