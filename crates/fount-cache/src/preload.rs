//! Bootstrap data consulted before the network.
//!
//! Hosts that render server-side can hand the already-decoded payloads to the
//! cache so the first read of each key settles without a fetch.

use crate::CacheKey;
use serde_json::Value;
use std::collections::HashMap;

/// An externally populated mapping from rendered cache key (`"GET::<url>"`)
/// to an already-decoded payload.
///
/// The cache consults the store once per key, before issuing a network fetch;
/// a hit is treated as already-settled data. The core never mutates the store.
#[derive(Debug, Clone, Default)]
pub struct PreloadStore {
    entries: HashMap<String, Value>,
}

impl PreloadStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object of `"METHOD::url"` keys, the shape a
    /// server-rendered bootstrap blob arrives in. Non-object input yields an
    /// empty store.
    pub fn from_json(value: Value) -> Self {
        let entries = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self { entries }
    }

    /// Insert a preloaded payload under a rendered key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Look up the preloaded payload for a cache key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<&Value> {
        self.entries.get(&key.to_string())
    }

    /// Whether the store holds any entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preload_lookup_by_rendered_key() {
        let mut store = PreloadStore::new();
        store.insert("GET::https://api.example.com/me", serde_json::json!({"id": 7}));

        let key = CacheKey::get("https://api.example.com/me");
        assert_eq!(store.get(&key), Some(&serde_json::json!({"id": 7})));

        let other = CacheKey::get("https://api.example.com/you");
        assert_eq!(store.get(&other), None);
    }

    #[test]
    fn test_preload_from_json_object() {
        let store = PreloadStore::from_json(serde_json::json!({
            "GET::https://api.example.com/me": {"id": 7},
        }));
        assert!(!store.is_empty());
        assert!(store.get(&CacheKey::get("https://api.example.com/me")).is_some());
    }

    #[test]
    fn test_preload_from_json_non_object_is_empty() {
        let store = PreloadStore::from_json(serde_json::json!([1, 2, 3]));
        assert!(store.is_empty());
    }
}
