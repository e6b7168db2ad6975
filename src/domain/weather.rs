use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod conversions;

pub use conversions::{
    MISSING, city_local_datetime, event_instant, fraction_to_percent, ms_to_kmh, round_half_up,
    round_temp, to_city_local_time,
};

/// One 3-hour forecast slot as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp_utc: i64,
    pub temperature_c: f32,
    pub feels_like_c: f32,
    pub humidity_pct: u8,
    pub wind_speed_ms: f32,
    pub visibility_m: Option<u32>,
    /// Probability of precipitation as a fraction in `[0, 1]`.
    pub precipitation_probability: Option<f32>,
    pub weather_category: String,
    pub icon_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A city's forecast window, ordered ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub city: String,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub utc_offset_secs: i32,
    pub samples: Vec<ForecastSample>,
}

impl ForecastSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> Option<&ForecastSample> {
        self.samples.first()
    }

    /// The first `count` samples, or fewer if the series is shorter.
    #[must_use]
    pub fn lookahead(&self, count: usize) -> &[ForecastSample] {
        &self.samples[..self.samples.len().min(count)]
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.city, country),
            None => self.city.clone(),
        }
    }
}

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])").expect("static category pattern"));

/// Splits a provider category such as `ThunderStorm` into `Thunder Storm`.
#[must_use]
pub fn format_category(category: &str) -> String {
    if category.is_empty() {
        return MISSING.to_string();
    }
    CAMEL_BOUNDARY
        .replace_all(category, " ${1}")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests;
