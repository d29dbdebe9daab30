use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::api::ObserverApi;
use crate::types::{Observation, ObservationKey};

/// Observation slice: key lists per kind, plus a lazily filled content cache.
#[derive(Debug)]
pub struct ObservationStore {
    api: Arc<dyn ObserverApi>,
    keys: RwLock<HashMap<String, Vec<ObservationKey>>>,
    contents: RwLock<HashMap<String, Observation>>,
}

impl ObservationStore {
    pub fn new(api: Arc<dyn ObserverApi>) -> Self {
        Self {
            api,
            keys: RwLock::new(HashMap::new()),
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// Last fetched key list for `kind`, if any.
    pub fn keys(&self, kind: &str) -> Option<Vec<ObservationKey>> {
        self.keys
            .read()
            .expect("observation keys lock poisoned")
            .get(kind)
            .cloned()
    }

    /// Cached observation for `key`, without touching the backend.
    pub fn cached(&self, key: &ObservationKey) -> Option<Observation> {
        self.contents
            .read()
            .expect("observation cache lock poisoned")
            .get(&key.cache_key())
            .cloned()
    }

    /// Replace the key list of `kind`. Other kinds are untouched.
    pub async fn fetch_keys(&self, kind: &str) -> crate::error::Result<Vec<ObservationKey>> {
        let keys = self.api.list_observation_keys(kind).await?;
        debug!(kind, count = keys.len(), "Fetched observation keys");
        self.keys
            .write()
            .expect("observation keys lock poisoned")
            .insert(kind.to_string(), keys.clone());
        Ok(keys)
    }

    /// Fetch one observation and cache it. A missing observation evicts any stale entry.
    pub async fn fetch(&self, key: &ObservationKey) -> crate::error::Result<Option<Observation>> {
        let observation = self.api.get_observation(key).await?;
        let mut contents = self.contents.write().expect("observation cache lock poisoned");
        match &observation {
            Some(obs) => {
                contents.insert(key.cache_key(), obs.clone());
            }
            None => {
                contents.remove(&key.cache_key());
            }
        }
        Ok(observation)
    }

    /// Return the cached observation, fetching it on first access.
    pub async fn get_or_fetch(
        &self,
        key: &ObservationKey,
    ) -> crate::error::Result<Option<Observation>> {
        if let Some(obs) = self.cached(key) {
            return Ok(Some(obs));
        }
        self.fetch(key).await
    }
}
