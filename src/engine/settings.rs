//! Opaque user records, the signed URL cache, and usage stats.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::cache::{CacheStats, read_json};
use crate::engine::MirrorCache;
use crate::storage::KeyValueStore;

impl<S: KeyValueStore> MirrorCache<S> {
    /// Store a user config record verbatim. Returns whether it was persisted.
    pub fn save_user_config<T: Serialize + ?Sized>(&mut self, config: &T) -> bool {
        let key = self.keys.user_config();
        self.save_record(&key, config)
    }

    pub fn load_user_config<T: DeserializeOwned>(&self) -> Option<T> {
        read_json(&self.store, &self.keys.user_config())
    }

    /// Store a user settings record verbatim. Returns whether it was persisted.
    pub fn save_user_settings<T: Serialize + ?Sized>(&mut self, settings: &T) -> bool {
        let key = self.keys.user_settings();
        self.save_record(&key, settings)
    }

    pub fn load_user_settings<T: DeserializeOwned>(&self) -> Option<T> {
        read_json(&self.store, &self.keys.user_settings())
    }

    /// Replace the signed URL cache (object key -> URL).
    pub fn save_file_urls(&mut self, urls: &BTreeMap<String, String>) -> bool {
        let key = self.keys.urls();
        self.save_record(&key, urls)
    }

    /// Load the signed URL cache; missing or corrupt data is an empty map.
    pub fn load_file_urls(&self) -> BTreeMap<String, String> {
        read_json(&self.store, &self.keys.urls()).unwrap_or_default()
    }

    /// Estimated storage footprint of the cache.
    pub fn stats(&self) -> CacheStats {
        let tree = self.tree_json();
        CacheStats::collect(&self.store, &self.keys, Some(&tree))
    }

    fn save_record<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.persist(key, &json).is_stored(),
            Err(e) => {
                warn!(key, error = %e, "failed to serialize record");
                false
            }
        }
    }
}
