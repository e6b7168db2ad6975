#![allow(clippy::cast_possible_truncation)]

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Placeholder shown wherever a value is unavailable.
pub const MISSING: &str = "—";

/// Shifts a UTC instant by the city offset and returns the zone-naive result.
///
/// The returned value is already city wall-clock time. It must be formatted
/// as-is; converting it through another time zone would apply the offset twice.
#[must_use]
pub fn city_local_datetime(timestamp_utc: i64, utc_offset_secs: i32) -> Option<NaiveDateTime> {
    let shifted = timestamp_utc.checked_add(i64::from(utc_offset_secs))?;
    DateTime::<Utc>::from_timestamp(shifted, 0).map(|dt| dt.naive_utc())
}

/// City-local wall-clock time, e.g. `3:00 PM`.
#[must_use]
pub fn to_city_local_time(timestamp_utc: i64, utc_offset_secs: i32) -> String {
    city_local_datetime(timestamp_utc, utc_offset_secs).map_or_else(
        || MISSING.to_string(),
        |dt| dt.format("%-I:%M %p").to_string(),
    )
}

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2`.
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[must_use]
pub fn ms_to_kmh(meters_per_sec: f32) -> i32 {
    round_half_up(f64::from(meters_per_sec) * 3.6) as i32
}

#[must_use]
pub fn round_temp(value: f32) -> i32 {
    round_half_up(f64::from(value)) as i32
}

#[must_use]
pub fn fraction_to_percent(fraction: Option<f32>) -> Option<i32> {
    fraction
        .filter(|value| value.is_finite())
        .map(|value| round_half_up(f64::from(value) * 100.0) as i32)
}

/// Interprets a zone-less wall-clock time as city-local and returns the instant.
#[must_use]
pub fn event_instant(local: NaiveDateTime, utc_offset_secs: i32) -> DateTime<Utc> {
    (local - Duration::seconds(i64::from(utc_offset_secs))).and_utc()
}
