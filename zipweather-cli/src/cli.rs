use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomUserError, InquireError, Text, validator::Validation};
use tokio::sync::broadcast;
use zipweather_core::{
    ClassifiedError, Config, StageEvent, WeatherData, WeatherPipeline, WeatherSession,
    is_valid_zip, normalize_zip_input, zip_error_message,
};

use crate::render::{self, ProgressView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "zipweather", version, about = "Current weather for a US ZIP code")]
pub struct Cli {
    /// Read configuration from this file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather for one ZIP code, prompting for it if omitted.
    Show {
        /// Five-digit US ZIP code.
        zip: Option<String>,
    },

    /// Keep prompting for ZIP codes until cancelled with Esc or Ctrl-C.
    Prompt,
}

enum Attempt<'a> {
    Submit(&'a str),
    Retry,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        tracing::debug!(?config, "configuration loaded");

        let mut session = WeatherSession::new(WeatherPipeline::from_config(&config)?);

        match self.command {
            Command::Show { zip } => {
                let zip = match zip {
                    Some(raw) => normalize_zip_input(&raw),
                    None => match prompt_zip().await? {
                        Some(zip) => zip,
                        None => return Ok(()),
                    },
                };
                lookup_with_retry(&mut session, &zip).await?;
            }
            Command::Prompt => {
                while let Some(zip) = prompt_zip().await? {
                    lookup_with_retry(&mut session, &zip).await?;
                }
            }
        }

        Ok(())
    }
}

async fn lookup_with_retry(session: &mut WeatherSession, zip: &str) -> anyhow::Result<()> {
    let mut outcome = lookup(session, Attempt::Submit(zip)).await;

    loop {
        match outcome {
            Ok(weather) => {
                println!("{}", render::weather_card(&weather));
                return Ok(());
            }
            Err(err) => {
                eprintln!("{}", render::error_line(&err));
                if !err.retryable || !confirm_retry().await? {
                    return Ok(());
                }
                outcome = lookup(session, Attempt::Retry).await;
            }
        }
    }
}

/// Run one attempt while printing stage progress as it is activated.
async fn lookup(
    session: &mut WeatherSession,
    attempt: Attempt<'_>,
) -> Result<WeatherData, ClassifiedError> {
    let mut events = session.sequencer().subscribe();
    let mut view = ProgressView::default();

    let outcome = {
        let work = async {
            match attempt {
                Attempt::Submit(zip) => session.submit(zip).await,
                Attempt::Retry => session.retry().await,
            }
        };
        tokio::pin!(work);

        loop {
            tokio::select! {
                biased;
                Ok(event) = events.recv() => print_progress(&mut view, event),
                outcome = &mut work => break outcome,
            }
        }
    };

    // Anything published in the same tick as the final result.
    loop {
        match events.try_recv() {
            Ok(event) => print_progress(&mut view, event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "progress output fell behind");
            }
            Err(_) => break,
        }
    }

    outcome
}

fn print_progress(view: &mut ProgressView, event: StageEvent) {
    if let Some(line) = view.on_event(event) {
        println!("{line}");
    }
}

/// Ask for a ZIP code. `None` when the user backs out.
async fn prompt_zip() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("ZIP code:")
            .with_placeholder("Enter ZIP code")
            .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
                let zip = normalize_zip_input(input);
                if is_valid_zip(&zip) {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid(zip_error_message(&zip).into()))
                }
            })
            .prompt()
    })
    .await
    .context("ZIP prompt task failed")?;

    match answer {
        Ok(raw) => Ok(Some(normalize_zip_input(&raw))),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read ZIP code"),
    }
}

async fn confirm_retry() -> anyhow::Result<bool> {
    let answer = tokio::task::spawn_blocking(|| {
        Confirm::new("Try again?").with_default(true).prompt()
    })
    .await
    .context("Retry prompt task failed")?;

    match answer {
        Ok(yes) => Ok(yes),
        Err(
            InquireError::NotTTY
            | InquireError::OperationCanceled
            | InquireError::OperationInterrupted,
        ) => Ok(false),
        Err(e) => Err(e).context("Failed to read retry answer"),
    }
}
