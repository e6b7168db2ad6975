pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod storage;

#[cfg(test)]
mod test_support;

use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use app::{
    report::Report,
    settings::{Settings, load_settings, save_settings, store_path},
};
use cli::Cli;
use data::{
    forecast::{ForecastClient, parse_series},
    uv::UvClient,
};
use domain::{
    alerts::{AlertDispatcher, AlertMode, AlertPolicy, TerminalNotifier, ToastBoard},
    calendar::{EventBook, enrich},
    insights::{InsightContext, InsightSummary, advise_commute},
    weather::ForecastSeries,
};
use storage::{
    JsonFileStore, KeyValueStore, MemoryStore,
    cache::{ForecastCache, cache_key},
    recent::RecentSearches,
};

pub async fn run(cli: Cli) -> Result<()> {
    run_with_output(cli, &mut std::io::stdout()).await
}

/// Runs one invocation, writing the report and alert lines to `out`.
pub async fn run_with_output<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    cli.validate()?;
    let config_dir = cli.config_dir.as_deref();
    let (settings, settings_path) = load_settings(!cli.no_store, config_dir);
    tracing::debug!(path = ?settings_path, "settings loaded");
    if let Some(path) = settings_path.as_deref() {
        write_default_settings(path, &settings);
    }

    let mut store = open_store(cli.no_store, config_dir);
    manage_events(&cli, &mut *store, out)?;
    if cli.clear_history {
        RecentSearches::new(&mut *store)
            .clear()
            .context("clearing recent searches failed")?;
    }

    let now = Utc::now();
    let series = load_series(&cli, &settings, &mut *store, now).await?;
    let recent = remember_search(&mut *store, &series);

    let uv_index = match (&cli.api_key, series.coordinates) {
        (Some(key), Some(coords)) if !cli.demo => {
            let client = match &cli.uv_url {
                Some(url) => UvClient::with_base_url(url.as_str(), key.as_str()),
                None => UvClient::new(key.as_str()),
            };
            client.fetch(coords).await
        }
        _ => None,
    };
    let ctx = InsightContext {
        now,
        uv_index,
        demo: cli.demo,
    };

    let Some(summary) = InsightSummary::compute(&series, &ctx, &settings.insights) else {
        writeln!(out, "No forecast data for {}.", series.display_name())?;
        return Ok(());
    };

    let book = EventBook::load(&mut *store);
    let events = enrich(book.events(), &series, &settings.insights.commute);
    let report = Report {
        series: &series,
        summary: &summary,
        commute: advise_commute(series.current(), &settings.insights.commute),
        events: &events,
        recent: &recent,
    };
    write!(out, "{report}")?;

    let mode = if cli.demo {
        AlertMode::Demo
    } else {
        AlertMode::Real
    };
    raise_alerts(&cli, &settings, &series.city, mode, summary.rain.minutes, out).await?;
    Ok(())
}

/// Leaves an editable copy of the defaults behind on first run.
fn write_default_settings(path: &Path, settings: &Settings) {
    if path.exists() {
        return;
    }
    match save_settings(path, settings) {
        Ok(()) => tracing::debug!(path = %path.display(), "default settings written"),
        Err(err) => tracing::warn!(path = %path.display(), "default settings not written: {err:#}"),
    }
}

fn open_store(disabled: bool, config_dir: Option<&Path>) -> Box<dyn KeyValueStore> {
    if disabled {
        return Box::new(MemoryStore::new());
    }
    let Some(path) = store_path(config_dir) else {
        return Box::new(MemoryStore::new());
    };
    match JsonFileStore::open(path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(%err, "persistent store unavailable, using memory");
            Box::new(MemoryStore::new())
        }
    }
}

fn manage_events<W: Write>(cli: &Cli, store: &mut dyn KeyValueStore, out: &mut W) -> Result<()> {
    let mut book = EventBook::load(store);
    if let Some((title, when)) = cli.new_event()?
        && let Some(event) = book.add(&title, when).context("saving event failed")?
    {
        writeln!(out, "Added event {} ({} at {})", event.id, event.title, event.local_time)?;
    }
    if let Some(id) = &cli.remove_event {
        if book.remove(id).context("removing event failed")? {
            writeln!(out, "Removed event {id}")?;
        } else {
            writeln!(out, "No event with id {id}")?;
        }
    }
    Ok(())
}

async fn load_series<S: KeyValueStore>(
    cli: &Cli,
    settings: &Settings,
    store: S,
    now: DateTime<Utc>,
) -> Result<ForecastSeries> {
    if let Some(path) = &cli.input {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading forecast file {} failed", path.display()))?;
        let payload: Value =
            serde_json::from_str(&raw).context("forecast file is not valid JSON")?;
        return Ok(parse_series(&payload)?);
    }

    let coords = cli.coordinates();
    let label = coords.map_or_else(
        || cli.default_city(),
        |c| format!("{:.4},{:.4}", c.latitude, c.longitude),
    );
    let key = cache_key(&label);
    let mut cache = ForecastCache::new(store, settings.cache);
    let dropped = cache.clear_expired(now);
    if dropped > 0 {
        tracing::debug!(dropped, "expired cache entries removed");
    }
    if !cli.no_cache
        && let Some(series) = cache.get::<ForecastSeries>(&key, now)
    {
        tracing::info!(location = %label, "using cached forecast");
        return Ok(series);
    }

    let api_key = cli
        .api_key
        .as_deref()
        .context("an OpenWeather API key is required (--api-key or OPENWEATHER_API_KEY)")?;
    let client = match &cli.forecast_url {
        Some(url) => ForecastClient::with_base_url(url.as_str(), api_key),
        None => ForecastClient::new(api_key),
    };
    let series = match coords {
        Some(coords) => client.fetch_coords(coords).await?,
        None => client.fetch_city(&label).await?,
    };
    tracing::info!(location = %label, slots = series.samples.len(), "forecast fetched");

    if let Err(err) = cache.set(&key, &series, now) {
        tracing::warn!(%err, "forecast not cached");
    }
    Ok(series)
}

fn remember_search<S: KeyValueStore>(store: S, series: &ForecastSeries) -> Vec<String> {
    let mut recent = RecentSearches::new(store);
    if series.city.is_empty() {
        return recent.list();
    }
    recent.add(&series.city).unwrap_or_else(|err| {
        tracing::warn!(%err, "recent searches not saved");
        recent.list()
    })
}

async fn raise_alerts<W: Write>(
    cli: &Cli,
    settings: &Settings,
    city: &str,
    mode: AlertMode,
    rain_minutes: Option<i64>,
    out: &mut W,
) -> Result<()> {
    let mut policy = AlertPolicy::new(MemoryStore::new(), settings.alerts);
    let mut dispatcher = AlertDispatcher::new(
        ToastBoard::new(settings.alerts.toast_ms),
        Some(Box::new(TerminalNotifier::new(settings.desktop_notifications))),
    );

    let mut decisions = vec![policy.evaluate(city, mode, rain_minutes)];
    if cli.test_alert {
        dispatcher.request_permission();
        decisions.push(policy.trigger_demo());
    }

    for decision in decisions {
        let Some(delivery) = dispatcher.dispatch(decision).await else {
            continue;
        };
        tracing::debug!(?delivery, "alert delivered");
        if let Some(toast) = dispatcher.toasts().visible(Utc::now()) {
            writeln!(out, "\n[{}] {}", toast.alert.title, toast.alert.body)?;
        }
    }
    Ok(())
}
