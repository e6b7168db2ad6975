use chrono::{DateTime, Utc};

use crate::domain::weather::{Coordinates, ForecastSample, ForecastSeries};

/// 2026-02-12T10:00:00Z
pub(crate) const BASE_TS: i64 = 1_770_890_400;
pub(crate) const SLOT_SECS: i64 = 3 * 3600;

pub(crate) fn base_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(BASE_TS, 0).expect("valid base timestamp")
}

pub(crate) fn sample_at(idx: usize, category: &str) -> ForecastSample {
    ForecastSample {
        timestamp_utc: BASE_TS + SLOT_SECS * i64::try_from(idx).expect("small index"),
        temperature_c: 12.0,
        feels_like_c: 11.0,
        humidity_pct: 60,
        wind_speed_ms: 3.0,
        visibility_m: Some(10_000),
        precipitation_probability: Some(0.1),
        weather_category: category.to_string(),
        icon_code: "04d".to_string(),
    }
}

pub(crate) fn series_of(categories: &[&str]) -> ForecastSeries {
    ForecastSeries {
        city: "Stockholm".to_string(),
        country: Some("SE".to_string()),
        coordinates: Some(Coordinates {
            latitude: 59.3293,
            longitude: 18.0686,
        }),
        utc_offset_secs: 0,
        samples: categories
            .iter()
            .enumerate()
            .map(|(idx, category)| sample_at(idx, category))
            .collect(),
    }
}

pub(crate) fn clear_series(len: usize) -> ForecastSeries {
    series_of(&vec!["Clear"; len])
}
