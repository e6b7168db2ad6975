use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::KeyValueStore;
use crate::error::StoreError;

pub const CACHE_PREFIX: &str = "weather_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_minutes: i64,
    pub max_items: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_items: 10,
        }
    }
}

#[must_use]
pub fn cache_key(city: &str) -> String {
    format!("{CACHE_PREFIX}{city}")
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct EntryStamp {
    timestamp: i64,
}

/// TTL cache of forecast payloads over a [`KeyValueStore`].
///
/// Entries are `{data, timestamp}` JSON objects keyed `weather_<city>`, with
/// `timestamp` in epoch milliseconds. At most `max_items` entries are kept;
/// inserting a new key into a full cache evicts the oldest entry.
#[derive(Debug)]
pub struct ForecastCache<S> {
    store: S,
    config: CacheConfig,
}

impl<S: KeyValueStore> ForecastCache<S> {
    pub fn new(store: S, config: CacheConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// The cached payload, or `None` if absent, expired or unreadable.
    /// Expired and unreadable entries are removed.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let raw = self.store.get(key)?;
        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(key, %err, "dropping unreadable cache entry");
                self.discard(key);
                return None;
            }
        };

        if self.is_expired(entry.timestamp, now) {
            tracing::debug!(key, "cache entry expired");
            self.discard(key);
            return None;
        }

        tracing::debug!(key, "cache hit");
        Some(entry.data)
    }

    pub fn set<T: Serialize>(
        &mut self,
        key: &str,
        data: &T,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&CacheEntry {
            data,
            timestamp: now.timestamp_millis(),
        })?;

        if self.store.get(key).is_none() {
            self.evict_if_full();
        }

        if let Err(err) = self.store.set(key, payload) {
            tracing::warn!(key, %err, "cache storage failed");
            self.clear_expired(now);
            return Err(err);
        }
        Ok(())
    }

    /// Removes expired and unreadable entries; returns how many were dropped.
    pub fn clear_expired(&mut self, now: DateTime<Utc>) -> usize {
        let stale: Vec<String> = self
            .cached_keys()
            .into_iter()
            .filter(|key| {
                self.stamp(key)
                    .is_none_or(|timestamp| self.is_expired(timestamp, now))
            })
            .collect();

        for key in &stale {
            self.discard(key);
        }
        stale.len()
    }

    fn evict_if_full(&mut self) {
        let keys = self.cached_keys();
        if keys.len() < self.config.max_items {
            return;
        }
        let oldest = keys
            .into_iter()
            .min_by_key(|key| self.stamp(key).unwrap_or(i64::MIN));
        if let Some(oldest) = oldest {
            tracing::debug!(key = %oldest, "evicting oldest cache entry");
            self.discard(&oldest);
        }
    }

    fn cached_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(CACHE_PREFIX))
            .collect()
    }

    fn stamp(&self, key: &str) -> Option<i64> {
        let raw = self.store.get(key)?;
        serde_json::from_str::<EntryStamp>(&raw)
            .ok()
            .map(|stamp| stamp.timestamp)
    }

    fn is_expired(&self, timestamp_ms: i64, now: DateTime<Utc>) -> bool {
        let ttl = Duration::minutes(self.config.ttl_minutes);
        now.timestamp_millis() - timestamp_ms > ttl.num_milliseconds()
    }

    fn discard(&mut self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            tracing::warn!(key, %err, "removing cache entry failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::{base_now, clear_series};

    fn cache() -> ForecastCache<MemoryStore> {
        ForecastCache::new(MemoryStore::new(), CacheConfig::default())
    }

    #[test]
    fn get_within_ttl_returns_stored_payload() {
        let mut cache = cache();
        let series = clear_series(3);
        let key = cache_key("Stockholm");
        cache.set(&key, &series, base_now()).expect("set");

        let fetched: Option<crate::domain::weather::ForecastSeries> =
            cache.get(&key, base_now() + Duration::minutes(30));
        assert_eq!(fetched, Some(series));
    }

    #[test]
    fn get_after_ttl_returns_none_and_removes_entry() {
        let mut cache = cache();
        let key = cache_key("Oslo");
        cache.set(&key, &42_u32, base_now()).expect("set");

        let fetched: Option<u32> = cache.get(&key, base_now() + Duration::minutes(31));
        assert!(fetched.is_none());
        assert!(cache.store().get(&key).is_none());
    }

    #[test]
    fn entry_layout_is_data_and_timestamp() {
        let mut cache = cache();
        cache.set("weather_Rome", &"sunny", base_now()).expect("set");
        let raw = cache.store().get("weather_Rome").expect("stored");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["data"], "sunny");
        assert_eq!(value["timestamp"], base_now().timestamp_millis());
    }

    #[test]
    fn full_cache_evicts_oldest_entry() {
        let mut cache = cache();
        for idx in 0..10 {
            let now = base_now() + Duration::minutes(idx);
            cache.set(&cache_key(&format!("city{idx}")), &idx, now).expect("set");
        }

        let now = base_now() + Duration::minutes(11);
        cache.set(&cache_key("newcomer"), &99, now).expect("set");

        assert!(cache.store().get("weather_city0").is_none());
        assert!(cache.store().get("weather_city1").is_some());
        assert!(cache.store().get("weather_newcomer").is_some());
        assert_eq!(cache.store().len(), 10);
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let mut cache = cache();
        for idx in 0..10 {
            let now = base_now() + Duration::minutes(idx);
            cache.set(&cache_key(&format!("city{idx}")), &idx, now).expect("set");
        }
        cache
            .set("weather_city5", &55, base_now() + Duration::minutes(12))
            .expect("set");
        assert_eq!(cache.store().len(), 10);
        assert!(cache.store().get("weather_city0").is_some());
    }

    #[test]
    fn unreadable_entry_is_a_miss_and_is_removed() {
        let mut store = MemoryStore::new();
        store.set("weather_Paris", "not json".to_string()).expect("set");
        let mut cache = ForecastCache::new(store, CacheConfig::default());

        let fetched: Option<u32> = cache.get("weather_Paris", base_now());
        assert!(fetched.is_none());
        assert!(cache.store().get("weather_Paris").is_none());
    }

    #[test]
    fn clear_expired_only_touches_stale_cache_keys() {
        let mut store = MemoryStore::new();
        store.set("recentSearches", "[]".to_string()).expect("set");
        let mut cache = ForecastCache::new(store, CacheConfig::default());
        cache.set("weather_old", &1, base_now()).expect("set");
        cache
            .set("weather_new", &2, base_now() + Duration::minutes(20))
            .expect("set");

        let removed = cache.clear_expired(base_now() + Duration::minutes(40));
        assert_eq!(removed, 1);
        let store = cache.into_inner();
        assert!(store.get("weather_old").is_none());
        assert!(store.get("weather_new").is_some());
        assert!(store.get("recentSearches").is_some());
    }
}
