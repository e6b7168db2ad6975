use std::fmt;

use crate::domain::{
    calendar::EnrichedEvent,
    insights::{CommuteAdvice, InsightSummary},
    weather::{ForecastSeries, MISSING, format_category, fraction_to_percent, round_temp},
};

/// Plain-text digest of every insight for one city.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub series: &'a ForecastSeries,
    pub summary: &'a InsightSummary,
    pub commute: Option<CommuteAdvice>,
    pub events: &'a [EnrichedEvent],
    pub recent: &'a [String],
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        writeln!(f, "ForecastIQ · {}", self.series.display_name())?;
        writeln!(
            f,
            "Now: {}°C (feels {}°C), {}",
            summary.temperature_c, summary.feels_like_c, summary.comfort
        )?;
        writeln!(f, "Wind: {} km/h", summary.wind_kmh)?;
        writeln!(f, "Rain chance (24h): {}%", summary.pop_max_24h_pct)?;
        match summary.visibility_km {
            Some(km) => writeln!(f, "Visibility: {km:.1} km")?,
            None => writeln!(f, "Visibility: {MISSING}")?,
        }
        writeln!(f, "Outdoor score: {}", summary.outdoor_text())?;
        writeln!(f, "Rain: {}", summary.rain.text)?;
        match &summary.next_change {
            Some(change) => writeln!(
                f,
                "Next change: {} {}",
                change.at_local_time,
                change.describe()
            )?,
            None => writeln!(f, "Next change: none expected")?,
        }
        writeln!(f, "{}", summary.uv_text)?;
        writeln!(
            f,
            "Commute: {}",
            self.commute.map_or(MISSING, CommuteAdvice::message)
        )?;

        writeln!(f)?;
        if self.events.is_empty() {
            writeln!(f, "Events: none")?;
        } else {
            writeln!(f, "Events:")?;
            for entry in self.events {
                write_event(f, entry)?;
            }
        }

        if !self.recent.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recent searches: {}", self.recent.join(", "))?;
        }
        Ok(())
    }
}

fn write_event(f: &mut fmt::Formatter<'_>, entry: &EnrichedEvent) -> fmt::Result {
    let event = &entry.event;
    writeln!(
        f,
        "- {} {} [{}]",
        event.local_time.format("%Y-%m-%d %H:%M"),
        event.title,
        event.id
    )?;
    let Some(sample) = &entry.forecast else {
        return writeln!(f, "  No forecast for this time.");
    };
    let pop = fraction_to_percent(sample.precipitation_probability)
        .map_or_else(|| MISSING.to_string(), |p| format!("{p}%"));
    writeln!(
        f,
        "  {}°C {}, {} rain. {}",
        round_temp(sample.temperature_c),
        format_category(&sample.weather_category),
        pop,
        entry.advice.map_or(MISSING, CommuteAdvice::message)
    )
}
