use serde::{Deserialize, Serialize};

use crate::domain::weather::{ForecastSample, fraction_to_percent, ms_to_kmh};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommuteConfig {
    pub rain_pct: i32,
    pub wind_kmh: i32,
    pub visibility_km: f64,
}

impl Default for CommuteConfig {
    fn default() -> Self {
        Self {
            rain_pct: 60,
            wind_kmh: 30,
            visibility_km: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommuteRisks {
    pub rain: bool,
    pub wind: bool,
    pub low_visibility: bool,
}

impl CommuteRisks {
    #[must_use]
    pub fn assess(sample: &ForecastSample, config: &CommuteConfig) -> Self {
        let pop_pct = fraction_to_percent(sample.precipitation_probability).unwrap_or(0);
        let wind_kmh = ms_to_kmh(sample.wind_speed_ms);
        let visibility_km = sample.visibility_m.map(|m| f64::from(m) / 1000.0);

        Self {
            rain: pop_pct >= config.rain_pct,
            wind: wind_kmh >= config.wind_kmh,
            low_visibility: visibility_km.is_some_and(|km| km < config.visibility_km),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommuteAdvice {
    Normal,
    LowVisibility,
    Rain,
    Wind,
}

impl CommuteAdvice {
    /// Low visibility outranks rain, which outranks wind.
    #[must_use]
    pub fn from_risks(risks: CommuteRisks) -> Self {
        if risks.low_visibility {
            Self::LowVisibility
        } else if risks.rain {
            Self::Rain
        } else if risks.wind {
            Self::Wind
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Normal => "Commute looks normal.",
            Self::LowVisibility => "Leave early—low visibility likely during commute.",
            Self::Rain => "Leave ~10 minutes early—rain likely during commute.",
            Self::Wind => "Allow extra time—windy conditions may slow traffic.",
        }
    }
}

#[must_use]
pub fn advise_commute(
    sample: Option<&ForecastSample>,
    config: &CommuteConfig,
) -> Option<CommuteAdvice> {
    sample.map(|s| CommuteAdvice::from_risks(CommuteRisks::assess(s, config)))
}
