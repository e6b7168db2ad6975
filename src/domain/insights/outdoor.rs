#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]

use serde::{Deserialize, Serialize};

use crate::domain::weather::ForecastSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutdoorConfig {
    /// Samples aggregated; two 3-hour slots cover the next ~6 hours.
    pub window: usize,
    pub min_score: u8,
    pub max_score: u8,
}

impl Default for OutdoorConfig {
    fn default() -> Self {
        Self {
            window: 2,
            min_score: 0,
            max_score: 10,
        }
    }
}

/// Aggregates over the look-ahead window that feed the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutdoorWindow {
    pub pop_max_pct: f64,
    pub temp_avg_c: f64,
    pub feels_avg_c: f64,
    pub wind_avg_kmh: f64,
}

impl OutdoorWindow {
    #[must_use]
    pub fn from_samples(samples: &[ForecastSample], window: usize) -> Self {
        let slice = &samples[..samples.len().min(window)];
        let count = slice.len().max(1) as f64;

        let pop_max_pct = slice
            .iter()
            .map(|s| f64::from(s.precipitation_probability.unwrap_or(0.0) * 100.0))
            .fold(0.0, f64::max);
        let mean = |f: fn(&ForecastSample) -> f64| slice.iter().map(f).sum::<f64>() / count;

        Self {
            pop_max_pct,
            temp_avg_c: mean(|s| f64::from(s.temperature_c)),
            feels_avg_c: mean(|s| f64::from(s.feels_like_c)),
            wind_avg_kmh: mean(|s| f64::from(s.wind_speed_ms) * 3.6),
        }
    }
}

#[must_use]
pub fn score_outdoor(samples: &[ForecastSample], config: &OutdoorConfig) -> u8 {
    score_window(&OutdoorWindow::from_samples(samples, config.window), config)
}

#[must_use]
pub fn score_window(window: &OutdoorWindow, config: &OutdoorConfig) -> u8 {
    let score = 10
        - rain_penalty(window.pop_max_pct)
        - wind_penalty(window.wind_avg_kmh)
        - cold_penalty(window.feels_avg_c)
        - heat_penalty(window.temp_avg_c);
    score.clamp(i32::from(config.min_score), i32::from(config.max_score)) as u8
}

fn rain_penalty(pop_max_pct: f64) -> i32 {
    if pop_max_pct >= 70.0 {
        4
    } else if pop_max_pct >= 40.0 {
        2
    } else if pop_max_pct >= 20.0 {
        1
    } else {
        0
    }
}

fn wind_penalty(wind_avg_kmh: f64) -> i32 {
    if wind_avg_kmh >= 35.0 {
        3
    } else if wind_avg_kmh >= 25.0 {
        2
    } else if wind_avg_kmh >= 18.0 {
        1
    } else {
        0
    }
}

fn cold_penalty(feels_avg_c: f64) -> i32 {
    if feels_avg_c <= -15.0 {
        4
    } else if feels_avg_c <= -8.0 {
        3
    } else if feels_avg_c <= -2.0 {
        2
    } else if feels_avg_c <= 2.0 {
        1
    } else {
        0
    }
}

fn heat_penalty(temp_avg_c: f64) -> i32 {
    if temp_avg_c >= 35.0 {
        3
    } else if temp_avg_c >= 30.0 {
        2
    } else {
        0
    }
}

#[must_use]
pub fn comfort_label(feels_like_c: f32) -> &'static str {
    match feels_like_c {
        f if f <= -10.0 => "Very cold",
        f if f <= 0.0 => "Chilly",
        f if f <= 20.0 => "Comfortable",
        f if f <= 28.0 => "Warm",
        _ => "Hot",
    }
}
