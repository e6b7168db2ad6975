#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::weather::{
    ForecastSample, ForecastSeries, MISSING, round_half_up, to_city_local_time,
};

pub const DEMO_RAIN_MINUTES: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Slots scanned for an onset; beyond ~48 h an alert is not actionable.
    pub lookahead: usize,
    pub pop_threshold: f32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            lookahead: 16,
            pop_threshold: 0.5,
        }
    }
}

#[must_use]
pub fn find_rain_onset<'a>(
    samples: &'a [ForecastSample],
    config: &RainConfig,
) -> Option<&'a ForecastSample> {
    samples
        .iter()
        .take(config.lookahead)
        .find(|sample| indicates_rain(sample, config))
}

fn indicates_rain(sample: &ForecastSample, config: &RainConfig) -> bool {
    sample.weather_category.to_lowercase().contains("rain")
        || sample
            .precipitation_probability
            .is_some_and(|pop| pop >= config.pop_threshold)
}

/// Minutes from `now` until the sample's slot starts. Negative once it has begun.
#[must_use]
pub fn minutes_until(sample: &ForecastSample, utc_offset_secs: i32, now: DateTime<Utc>) -> i64 {
    let offset_ms = i64::from(utc_offset_secs) * 1000;
    let event_city_ms = sample
        .timestamp_utc
        .saturating_mul(1000)
        .saturating_add(offset_ms);
    let now_city_ms = now.timestamp_millis().saturating_add(offset_ms);
    round_half_up(event_city_ms.saturating_sub(now_city_ms) as f64 / 60_000.0) as i64
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RainHeadline {
    pub text: String,
    pub minutes: Option<i64>,
    pub at_text: String,
}

#[must_use]
pub fn rain_headline(
    series: &ForecastSeries,
    now: DateTime<Utc>,
    config: &RainConfig,
    demo: bool,
) -> RainHeadline {
    if series.is_empty() {
        return RainHeadline {
            text: "Search a city to activate proactive alerts.".to_string(),
            minutes: None,
            at_text: MISSING.to_string(),
        };
    }

    if demo {
        return RainHeadline {
            text: format!("Rain starts in ~{DEMO_RAIN_MINUTES} minutes (Demo Mode)."),
            minutes: Some(DEMO_RAIN_MINUTES),
            at_text: format!("in ~{DEMO_RAIN_MINUTES} minutes"),
        };
    }

    let Some(onset) = find_rain_onset(&series.samples, config) else {
        return RainHeadline {
            text: "No significant rain expected soon.".to_string(),
            minutes: None,
            at_text: MISSING.to_string(),
        };
    };

    let minutes = minutes_until(onset, series.utc_offset_secs, now);
    let at = to_city_local_time(onset.timestamp_utc, series.utc_offset_secs);
    let text = if minutes >= 0 {
        format!("Rain likely in ~{minutes} min (around {at}).")
    } else {
        format!("Rain likely around {at}.")
    };

    RainHeadline {
        text,
        minutes: Some(minutes),
        at_text: at,
    }
}
