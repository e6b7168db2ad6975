use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        insights::{CommuteAdvice, CommuteConfig, advise_commute, pick_nearest},
        weather::{ForecastSample, ForecastSeries, event_instant},
    },
    error::StoreError,
    storage::KeyValueStore,
};

pub const EVENTS_KEY: &str = "fiq_events";
const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// Wall-clock time with no zone; interpreted in the forecast city's time.
    #[serde(rename = "time")]
    pub local_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub event: CalendarEvent,
    pub forecast: Option<ForecastSample>,
    pub advice: Option<CommuteAdvice>,
}

#[must_use]
pub fn parse_event_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EVENT_TIME_FORMAT).ok()
}

/// User events persisted as a JSON array under [`EVENTS_KEY`].
#[derive(Debug)]
pub struct EventBook<S> {
    store: S,
    events: Vec<CalendarEvent>,
}

impl<S: KeyValueStore> EventBook<S> {
    pub fn load(store: S) -> Self {
        let events = store
            .get(EVENTS_KEY)
            .map(|raw| {
                serde_json::from_str(&raw).unwrap_or_else(|err| {
                    tracing::warn!(%err, "ignoring unreadable calendar events");
                    Vec::new()
                })
            })
            .unwrap_or_default();
        Self { store, events }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Adds an event; blank titles are ignored and yield `Ok(None)`.
    pub fn add(
        &mut self,
        title: &str,
        local_time: NaiveDateTime,
    ) -> Result<Option<CalendarEvent>, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let event = CalendarEvent {
            id: new_event_id(),
            title: title.to_string(),
            local_time,
        };
        self.events.push(event.clone());
        self.persist()?;
        Ok(Some(event))
    }

    /// Removes the event with `id`; returns whether one was found.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        if self.events.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.events)?;
        self.store.set(EVENTS_KEY, payload)
    }
}

fn new_event_id() -> String {
    format!("{:016x}", rand::rng().random::<u64>())
}

/// Pairs each event with its nearest forecast slot and commute advice,
/// ordered by event time.
#[must_use]
pub fn enrich(
    events: &[CalendarEvent],
    series: &ForecastSeries,
    config: &CommuteConfig,
) -> Vec<EnrichedEvent> {
    let mut enriched: Vec<EnrichedEvent> = events
        .iter()
        .map(|event| {
            let target = event_instant(event.local_time, series.utc_offset_secs);
            let forecast = pick_nearest(&series.samples, target);
            EnrichedEvent {
                event: event.clone(),
                forecast: forecast.cloned(),
                advice: advise_commute(forecast, config),
            }
        })
        .collect();
    enriched.sort_by_key(|e| e.event.local_time);
    enriched
}
