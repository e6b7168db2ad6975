use super::KeyValueStore;
use crate::error::StoreError;

pub const RECENT_KEY: &str = "recentSearches";
pub const MAX_RECENT: usize = 5;

/// Most-recent-first list of searched city names.
#[derive(Debug)]
pub struct RecentSearches<S> {
    store: S,
}

impl<S: KeyValueStore> RecentSearches<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<String> {
        self.store
            .get(RECENT_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn add(&mut self, city: &str) -> Result<Vec<String>, StoreError> {
        let mut updated = vec![city.to_string()];
        updated.extend(self.list().into_iter().filter(|existing| existing != city));
        updated.truncate(MAX_RECENT);
        self.store.set(RECENT_KEY, serde_json::to_string(&updated)?)?;
        Ok(updated)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(RECENT_KEY)
    }
}
