#![allow(dead_code)]

use chrono::{DateTime, Utc};
use forecastiq::domain::weather::{Coordinates, ForecastSample, ForecastSeries};
use serde_json::{Value, json};

/// 2026-02-12T10:00:00Z
pub const BASE_TS: i64 = 1_770_890_400;
pub const SLOT_SECS: i64 = 3 * 3600;

pub fn base_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(BASE_TS, 0).expect("valid base timestamp")
}

pub fn sample(idx: i64, category: &str, pop: f32) -> ForecastSample {
    ForecastSample {
        timestamp_utc: BASE_TS + SLOT_SECS * idx,
        temperature_c: 14.0,
        feels_like_c: 13.0,
        humidity_pct: 70,
        wind_speed_ms: 4.0,
        visibility_m: Some(10_000),
        precipitation_probability: Some(pop),
        weather_category: category.to_string(),
        icon_code: "03d".to_string(),
    }
}

pub fn stockholm_series(samples: Vec<ForecastSample>) -> ForecastSeries {
    ForecastSeries {
        city: "Stockholm".to_string(),
        country: Some("SE".to_string()),
        coordinates: Some(Coordinates {
            latitude: 59.3293,
            longitude: 18.0686,
        }),
        utc_offset_secs: 3600,
        samples,
    }
}

/// OpenWeather `/forecast` body with a rain slot 20 minutes after
/// [`base_now`] at an offset of one hour.
pub fn forecast_payload() -> Value {
    json!({
        "cod": "200",
        "cnt": 3,
        "list": [
            {
                "dt": BASE_TS - 40 * 60,
                "main": {"temp": 6.2, "feels_like": 3.9, "humidity": 88},
                "weather": [{"id": 804, "main": "Clouds", "icon": "04d"}],
                "wind": {"speed": 6.1},
                "visibility": 10000,
                "pop": 0.3
            },
            {
                "dt": BASE_TS + 20 * 60,
                "main": {"temp": 5.8, "feels_like": 2.7, "humidity": 93},
                "weather": [{"id": 500, "main": "Rain", "icon": "10d"}],
                "wind": {"speed": 7.4},
                "visibility": 6000,
                "pop": 0.86
            },
            {
                "dt": BASE_TS + 20 * 60 + SLOT_SECS,
                "main": {"temp": 5.1, "feels_like": 1.9, "humidity": 95},
                "weather": [{"id": 501, "main": "Rain", "icon": "10d"}],
                "wind": {"speed": 8.0},
                "visibility": 4000,
                "pop": 0.9
            }
        ],
        "city": {
            "id": 2_673_730,
            "name": "Stockholm",
            "country": "SE",
            "timezone": 3600,
            "coord": {"lat": 59.3293, "lon": 18.0686}
        }
    })
}
