#![allow(clippy::cast_possible_truncation)]

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::forecast::{http_client, lenient};
use crate::domain::weather::Coordinates;

const ONE_CALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Current UV index from the One Call API. Not every key has access, so
/// every failure degrades to `None`.
#[derive(Debug, Clone)]
pub struct UvClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl UvClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(ONE_CALL_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch(&self, coords: Coordinates) -> Option<f32> {
        match self.request(coords).await {
            Ok(payload) => parse_uv(&payload),
            Err(err) => {
                tracing::info!(%err, "uv index unavailable");
                None
            }
        }
    }

    async fn request(&self, coords: Coordinates) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.base_url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("exclude", "minutely,alerts".to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[must_use]
pub fn parse_uv(payload: &Value) -> Option<f32> {
    OneCallResponse::deserialize(payload)
        .ok()?
        .current?
        .uvi
        .filter(|uv| uv.is_finite())
        .map(|uv| uv as f32)
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default, deserialize_with = "lenient")]
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    #[serde(default, deserialize_with = "lenient")]
    uvi: Option<f64>,
}
