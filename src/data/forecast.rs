#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    domain::weather::{Coordinates, ForecastSample, ForecastSeries, round_half_up},
    error::ForecastError,
};

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "http client setup failed, using defaults");
            Client::new()
        })
}

/// OpenWeather 5 day / 3 hour forecast, metric units.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ForecastClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(FORECAST_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch_city(&self, city: &str) -> Result<ForecastSeries, ForecastError> {
        self.fetch(&[("q", city.to_string())], city).await
    }

    pub async fn fetch_coords(&self, coords: Coordinates) -> Result<ForecastSeries, ForecastError> {
        let label = format!("{:.4},{:.4}", coords.latitude, coords.longitude);
        self.fetch(
            &[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
            &label,
        )
        .await
    }

    async fn fetch(
        &self,
        query: &[(&str, String)],
        label: &str,
    ) -> Result<ForecastSeries, ForecastError> {
        tracing::debug!(location = label, "requesting forecast");
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ForecastError::CityNotFound(label.to_string()));
        }
        let payload: Value = response.error_for_status()?.json().await?;
        parse_series(&payload)
    }
}

/// Decodes a forecast payload.
///
/// Slots without a usable `dt` are dropped. Other fields that are missing or
/// not numeric fall back to zero, or to `None` for visibility and
/// precipitation.
pub fn parse_series(payload: &Value) -> Result<ForecastSeries, ForecastError> {
    let response = ForecastResponse::deserialize(payload)
        .map_err(|_| ForecastError::Malformed("forecast payload is not an object"))?;
    let list = response
        .list
        .ok_or(ForecastError::Malformed("missing forecast list"))?;
    let city = response.city.unwrap_or_default();

    let mut samples: Vec<ForecastSample> = list.iter().filter_map(parse_sample).collect();
    samples.sort_by_key(|s| s.timestamp_utc);

    let coordinates = city.coord.and_then(|coord| {
        Some(Coordinates {
            latitude: coord.lat?,
            longitude: coord.lon?,
        })
    });

    Ok(ForecastSeries {
        city: city.name.unwrap_or_default(),
        country: city.country.filter(|c| !c.is_empty()),
        coordinates,
        utc_offset_secs: city
            .timezone
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0),
        samples,
    })
}

fn parse_sample(item: &Value) -> Option<ForecastSample> {
    let slot = ListItem::deserialize(item).ok()?;
    let timestamp_utc = slot.dt?;
    if DateTime::<Utc>::from_timestamp(timestamp_utc, 0).is_none() {
        tracing::debug!(timestamp_utc, "dropping forecast slot outside the representable range");
        return None;
    }
    let main = slot.main.unwrap_or_default();
    let weather = slot
        .weather
        .and_then(|w| w.into_iter().next())
        .unwrap_or_default();

    Some(ForecastSample {
        timestamp_utc,
        temperature_c: main.temp.unwrap_or(0.0),
        feels_like_c: main.feels_like.unwrap_or(0.0),
        humidity_pct: main
            .humidity
            .map_or(0, |h| round_half_up(h.clamp(0.0, 100.0)) as u8),
        wind_speed_ms: slot.wind.and_then(|w| w.speed).unwrap_or(0.0),
        visibility_m: slot
            .visibility
            .filter(|v| *v >= 0.0)
            .map(|v| round_half_up(v) as u32),
        precipitation_probability: slot.pop,
        weather_category: weather.main.unwrap_or_default(),
        icon_code: weather.icon.unwrap_or_default(),
    })
}

/// Decodes a field as `T`, or `None` when it is absent or has another shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default, deserialize_with = "lenient")]
    list: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    city: Option<CityBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct CityBlock {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    timezone: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    coord: Option<CoordBlock>,
}

#[derive(Debug, Deserialize)]
struct CoordBlock {
    #[serde(default, deserialize_with = "lenient")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(default, deserialize_with = "lenient")]
    dt: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    main: Option<MainBlock>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<WeatherBlock>>,
    #[serde(default, deserialize_with = "lenient")]
    wind: Option<WindBlock>,
    #[serde(default, deserialize_with = "lenient")]
    visibility: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pop: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    #[serde(default, deserialize_with = "lenient")]
    temp: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    feels_like: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherBlock {
    #[serde(default, deserialize_with = "lenient")]
    main: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    #[serde(default, deserialize_with = "lenient")]
    speed: Option<f32>,
}
