use chrono::{NaiveDate, TimeZone, Utc};

use super::*;

// 2026-02-12T10:00:00Z
const BASE_TS: i64 = 1_770_890_400;

#[test]
fn city_local_time_applies_offset_once() {
    assert_eq!(to_city_local_time(BASE_TS, 0), "10:00 AM");
    assert_eq!(to_city_local_time(BASE_TS, 3600), "11:00 AM");
    assert_eq!(to_city_local_time(BASE_TS, -5 * 3600), "5:00 AM");
    assert_eq!(to_city_local_time(BASE_TS, 5 * 3600 + 1800), "3:30 PM");
}

#[test]
fn city_local_time_crosses_midnight() {
    assert_eq!(to_city_local_time(BASE_TS, 14 * 3600), "12:00 AM");
    let local = city_local_datetime(BASE_TS, 14 * 3600).expect("in range");
    assert_eq!(local.date(), NaiveDate::from_ymd_opt(2026, 2, 13).expect("valid date"));
}

#[test]
fn city_local_time_out_of_range_is_placeholder() {
    assert_eq!(to_city_local_time(i64::MAX, 3600), MISSING);
    assert!(city_local_datetime(i64::MAX, 1).is_none());
}

#[test]
fn halves_round_toward_positive_infinity() {
    assert_eq!(round_temp(2.5), 3);
    assert_eq!(round_temp(-2.5), -2);
    assert_eq!(round_temp(-9.5), -9);
    assert_eq!(round_temp(-9.6), -10);
}

#[test]
fn wind_conversion_rounds_to_whole_kmh() {
    assert_eq!(ms_to_kmh(0.0), 0);
    assert_eq!(ms_to_kmh(5.0), 18);
    assert_eq!(ms_to_kmh(8.4), 30);
    assert_eq!(ms_to_kmh(10.0), 36);
}

#[test]
fn fraction_to_percent_handles_absent_and_non_finite() {
    assert_eq!(fraction_to_percent(Some(0.0)), Some(0));
    assert_eq!(fraction_to_percent(Some(0.456)), Some(46));
    assert_eq!(fraction_to_percent(Some(1.0)), Some(100));
    assert_eq!(fraction_to_percent(None), None);
    assert_eq!(fraction_to_percent(Some(f32::NAN)), None);
}

#[test]
fn event_instant_reverses_city_offset() {
    let local = NaiveDate::from_ymd_opt(2026, 2, 12)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time");
    let instant = event_instant(local, 2 * 3600);
    assert_eq!(
        instant,
        Utc.with_ymd_and_hms(2026, 2, 12, 10, 0, 0).single().expect("valid instant")
    );
    assert_eq!(instant.timestamp(), BASE_TS);
}

#[test]
fn format_category_splits_camel_case() {
    assert_eq!(format_category("Clear"), "Clear");
    assert_eq!(format_category("ThunderStorm"), "Thunder Storm");
    assert_eq!(format_category(""), MISSING);
}

#[test]
fn series_lookahead_is_bounded_by_length() {
    let series = ForecastSeries {
        city: "Oslo".to_string(),
        country: Some("NO".to_string()),
        coordinates: None,
        utc_offset_secs: 3600,
        samples: Vec::new(),
    };
    assert!(series.lookahead(16).is_empty());
    assert!(series.current().is_none());
    assert_eq!(series.display_name(), "Oslo, NO");
}
