use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::types::Entity;

/// Last-fetched snapshot of one entity type, keyed by server id.
///
/// Every mutation swaps or edits the map under a single write lock, so a
/// reader never sees half of an update.
#[derive(Debug)]
pub struct EntityMap<V: Entity> {
    inner: RwLock<BTreeMap<String, V>>,
}

impl<V: Entity> Default for EntityMap<V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<V: Entity> EntityMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map with `items`.
    pub fn replace_all(&self, items: impl IntoIterator<Item = V>) {
        let fresh: BTreeMap<String, V> = items
            .into_iter()
            .map(|v| (v.id().to_string(), v))
            .collect();
        *self.inner.write().expect("entity map lock poisoned") = fresh;
    }

    /// Insert or overwrite `items`, leaving every other entry alone.
    pub fn merge(&self, items: impl IntoIterator<Item = V>) {
        let mut map = self.inner.write().expect("entity map lock poisoned");
        for v in items {
            map.insert(v.id().to_string(), v);
        }
    }

    pub fn remove(&self, id: &str) -> Option<V> {
        self.inner
            .write()
            .expect("entity map lock poisoned")
            .remove(id)
    }

    pub fn get(&self, id: &str) -> Option<V> {
        self.inner
            .read()
            .expect("entity map lock poisoned")
            .get(id)
            .cloned()
    }

    /// All entities, ordered by id.
    pub fn values(&self) -> Vec<V> {
        self.inner
            .read()
            .expect("entity map lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Website;

    fn site(id: &str, url: &str) -> Website {
        Website {
            id: id.into(),
            url: url.into(),
        }
    }

    #[test]
    fn replace_all_drops_previous_entries() {
        let map = EntityMap::new();
        map.replace_all([site("2", "https://b.dev")]);
        map.replace_all([site("1", "https://a.dev")]);
        assert_eq!(map.values(), vec![site("1", "https://a.dev")]);
    }

    #[test]
    fn merge_keeps_unrelated_entries() {
        let map = EntityMap::new();
        map.replace_all([site("1", "https://a.dev")]);
        map.merge([site("2", "https://b.dev"), site("1", "https://a2.dev")]);
        assert_eq!(map.values().len(), 2);
        assert_eq!(map.get("1").unwrap().url, "https://a2.dev");
        assert!(map.get("2").is_some());
    }

    #[test]
    fn remove_and_empty() {
        let map = EntityMap::new();
        assert!(map.values().is_empty());
        map.merge([site("1", "https://a.dev")]);
        assert!(map.remove("1").is_some());
        assert!(map.remove("1").is_none());
        assert!(map.values().is_empty());
    }
}
