use chrono::{DateTime, Utc};

use crate::domain::weather::ForecastSample;

/// Index of the sample closest to `target`; ties keep the earlier sample.
#[must_use]
pub fn nearest_index(samples: &[ForecastSample], target: DateTime<Utc>) -> Option<usize> {
    let target_ms = target.timestamp_millis();
    let mut best: Option<(usize, u64)> = None;

    for (idx, sample) in samples.iter().enumerate() {
        let distance = sample.timestamp_utc.saturating_mul(1000).abs_diff(target_ms);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((idx, distance));
        }
    }

    best.map(|(idx, _)| idx)
}

#[must_use]
pub fn pick_nearest(samples: &[ForecastSample], target: DateTime<Utc>) -> Option<&ForecastSample> {
    nearest_index(samples, target).map(|idx| &samples[idx])
}
