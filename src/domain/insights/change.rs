use serde::{Deserialize, Serialize};

use crate::domain::weather::{ForecastSeries, format_category, to_city_local_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeConfig {
    pub lookahead: usize,
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self { lookahead: 16 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionChange {
    pub index: usize,
    pub at_local_time: String,
    pub from: String,
    pub to: String,
}

impl ConditionChange {
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "({} → {})",
            format_category(&self.from),
            format_category(&self.to)
        )
    }
}

/// First slot within the look-ahead whose category differs from slot 0.
#[must_use]
pub fn next_condition_change(
    series: &ForecastSeries,
    config: &ChangeConfig,
) -> Option<ConditionChange> {
    let baseline = &series.samples.first()?.weather_category;
    series
        .lookahead(config.lookahead)
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, sample)| {
            !sample.weather_category.is_empty() && sample.weather_category != *baseline
        })
        .map(|(index, sample)| ConditionChange {
            index,
            at_local_time: to_city_local_time(sample.timestamp_utc, series.utc_offset_secs),
            from: baseline.clone(),
            to: sample.weather_category.clone(),
        })
}
