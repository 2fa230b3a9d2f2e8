use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::provider::GeocoderId;

/// Top-level configuration, read from disk when present.
///
/// Example TOML:
/// geocoder = "zippopotam"
/// weather_url = "https://api.weather.gov"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Geocoder id, e.g. "census" or "zippopotam". Defaults to census.
    pub geocoder: Option<String>,

    /// Base endpoint override for the selected geocoder.
    pub geocoder_url: Option<String>,

    /// Base endpoint override for the weather service.
    pub weather_url: Option<String>,
}

impl Config {
    /// Return the configured geocoder as a strongly-typed GeocoderId.
    pub fn geocoder_id(&self) -> Result<GeocoderId> {
        match self.geocoder.as_deref() {
            Some(s) => GeocoderId::try_from(s),
            None => Ok(GeocoderId::default()),
        }
    }

    /// Base endpoint of the selected geocoder.
    pub fn geocoder_base_url(&self) -> Result<String> {
        let id = self.geocoder_id()?;
        Ok(self
            .geocoder_url
            .clone()
            .unwrap_or_else(|| id.default_base_url().to_string()))
    }

    pub fn weather_base_url(&self) -> &str {
        self.weather_url.as_deref().unwrap_or(crate::provider::nws::DEFAULT_BASE_URL)
    }

    /// Load config from the platform location, or defaults if it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Surface a bad geocoder id at load time rather than on first lookup.
        cfg.geocoder_id()
            .with_context(|| format!("Invalid geocoder in config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "zipweather", "zipweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
