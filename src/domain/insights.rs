//! Derived insights over a [`ForecastSeries`].
//!
//! Everything here is a pure function of the series plus an injected "now";
//! no function in this module fails. Missing inputs surface as `None` or the
//! [`MISSING`](crate::domain::weather::MISSING) placeholder.

#![allow(clippy::cast_possible_truncation)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::weather::{ForecastSeries, ms_to_kmh, round_half_up, round_temp};

pub mod change;
pub mod commute;
pub mod nearest;
pub mod outdoor;
pub mod rain;
pub mod uv;

pub use change::{ChangeConfig, ConditionChange, next_condition_change};
pub use commute::{CommuteAdvice, CommuteConfig, CommuteRisks, advise_commute};
pub use nearest::{nearest_index, pick_nearest};
pub use outdoor::{OutdoorConfig, OutdoorWindow, comfort_label, score_outdoor};
pub use rain::{RainConfig, RainHeadline, find_rain_onset, minutes_until, rain_headline};
pub use uv::{UvLevel, uv_advice};

/// UV index shown while demo mode is on.
pub const DEMO_UV_INDEX: f32 = 9.5;

/// Slots considered for the "next 24h" precipitation maximum.
const DAY_SLOTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    pub rain: RainConfig,
    pub outdoor: OutdoorConfig,
    pub change: ChangeConfig,
    pub commute: CommuteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightContext {
    pub now: DateTime<Utc>,
    pub uv_index: Option<f32>,
    pub demo: bool,
}

impl InsightContext {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            uv_index: None,
            demo: false,
        }
    }

    #[must_use]
    pub fn effective_uv(&self) -> Option<f32> {
        if self.demo {
            Some(DEMO_UV_INDEX)
        } else {
            self.uv_index
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightSummary {
    pub outdoor_score: u8,
    pub comfort: &'static str,
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub wind_kmh: i32,
    pub pop_max_24h_pct: i32,
    pub visibility_km: Option<f64>,
    pub next_change: Option<ConditionChange>,
    pub rain: RainHeadline,
    pub uv_text: String,
}

impl InsightSummary {
    /// `None` when the series has no samples.
    #[must_use]
    pub fn compute(
        series: &ForecastSeries,
        ctx: &InsightContext,
        settings: &InsightSettings,
    ) -> Option<Self> {
        let current = series.current()?;
        let feels_like_c = round_temp(current.feels_like_c);

        let pop_max = series
            .lookahead(DAY_SLOTS)
            .iter()
            .map(|s| s.precipitation_probability.unwrap_or(0.0))
            .fold(0.0_f32, f32::max);
        let pop_max_24h_pct = round_half_up(f64::from(pop_max * 100.0).clamp(0.0, 100.0)) as i32;

        Some(Self {
            outdoor_score: score_outdoor(&series.samples, &settings.outdoor),
            comfort: comfort_label(round_half_up(f64::from(current.feels_like_c)) as f32),
            temperature_c: round_temp(current.temperature_c),
            feels_like_c,
            wind_kmh: ms_to_kmh(current.wind_speed_ms),
            pop_max_24h_pct,
            visibility_km: current.visibility_m.map(|m| f64::from(m) / 1000.0),
            next_change: next_condition_change(series, &settings.change),
            rain: rain_headline(series, ctx.now, &settings.rain, ctx.demo),
            uv_text: uv_advice(ctx.effective_uv()),
        })
    }

    #[must_use]
    pub fn outdoor_text(&self) -> String {
        format!("{}/10", self.outdoor_score)
    }
}
