#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::Parser;

use crate::domain::{calendar::parse_event_time, weather::Coordinates};

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "forecastiq",
    version,
    about = "Proactive weather insights, rain alerts and event advice"
)]
pub struct Cli {
    /// City name (default: Stockholm)
    pub city: Option<String>,

    /// Direct latitude (requires --lon)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Direct longitude (requires --lat)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Read a saved OpenWeather forecast payload instead of fetching
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Demo mode: simulated rain in ~3 minutes and a fixed UV index
    #[arg(long)]
    pub demo: bool,

    /// Fire a demo alert immediately
    #[arg(long)]
    pub test_alert: bool,

    /// Add a calendar event, e.g. "Standup@2026-02-12T09:30" (city time)
    #[arg(long, value_name = "TITLE@TIME")]
    pub add_event: Option<String>,

    /// Remove a calendar event by id
    #[arg(long, value_name = "ID")]
    pub remove_event: Option<String>,

    /// Clear the recent searches list
    #[arg(long)]
    pub clear_history: bool,

    /// Bypass the forecast cache
    #[arg(long)]
    pub no_cache: bool,

    /// Keep all state in memory; nothing is read from or written to disk
    #[arg(long)]
    pub no_store: bool,

    /// Directory holding settings.json and store.json
    #[arg(long, env = "FORECASTIQ_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[arg(long, hide = true)]
    pub forecast_url: Option<String>,

    #[arg(long, hide = true)]
    pub uv_url: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn default_city(&self) -> String {
        self.city.clone().unwrap_or_else(|| "Stockholm".to_string())
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--lat and --lon must be provided together")
            }
            (Some(lat), Some(lon))
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) =>
            {
                anyhow::bail!("coordinates out of range: {lat},{lon}")
            }
            _ => {}
        }
        if let Some(spec) = &self.add_event {
            parse_event_arg(spec)?;
        }
        Ok(())
    }

    pub fn new_event(&self) -> anyhow::Result<Option<(String, NaiveDateTime)>> {
        self.add_event.as_deref().map(parse_event_arg).transpose()
    }
}

/// Splits `TITLE@YYYY-MM-DDTHH:MM` at the last `@`.
pub fn parse_event_arg(spec: &str) -> anyhow::Result<(String, NaiveDateTime)> {
    let (title, time) = spec
        .rsplit_once('@')
        .context("event must look like TITLE@YYYY-MM-DDTHH:MM")?;
    if title.trim().is_empty() {
        anyhow::bail!("event title must not be empty");
    }
    let when = parse_event_time(time).with_context(|| format!("invalid event time {time:?}"))?;
    Ok((title.trim().to_string(), when))
}
