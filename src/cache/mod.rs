//! Persisted cache segments under one key namespace.

pub mod guard;
pub mod snapshot;
pub mod stats;

pub use guard::{StorageGuard, WriteOutcome};
pub use snapshot::SnapshotCache;
pub use stats::{CacheStats, format_bytes};

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::CacheError;
use crate::storage::KeyValueStore;

/// Default namespace prefix for every persisted key.
pub const DEFAULT_NAMESPACE: &str = "r2_image_hosting_";

/// Builds the namespaced keys of every cache segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    namespace: String,
}

impl CacheKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Listing snapshot of one path.
    pub fn file_list(&self, path: &str) -> String {
        format!("{}files_{}", self.namespace, path)
    }

    /// Signed URL map.
    pub fn urls(&self) -> String {
        format!("{}urls", self.namespace)
    }

    /// Global freshness timestamp (epoch milliseconds).
    pub fn timestamp(&self) -> String {
        format!("{}timestamp", self.namespace)
    }

    pub fn bucket_tree(&self) -> String {
        format!("{}bucket_tree", self.namespace)
    }

    pub fn all_files(&self) -> String {
        format!("{}all_files", self.namespace)
    }

    pub fn user_config(&self) -> String {
        format!("{}user_config", self.namespace)
    }

    pub fn user_settings(&self) -> String {
        format!("{}user_settings", self.namespace)
    }

    /// Check if `key` belongs to this namespace.
    pub fn owns(&self, key: &str) -> bool {
        key.starts_with(&self.namespace)
    }

    /// Check if `key` is a listing snapshot.
    pub fn is_file_list(&self, key: &str) -> bool {
        key.strip_prefix(&self.namespace)
            .is_some_and(|rest| rest.starts_with("files_"))
    }

    /// All keys in `store` under this namespace.
    pub fn owned_keys<S: KeyValueStore + ?Sized>(&self, store: &S) -> Vec<String> {
        store.keys().into_iter().filter(|k| self.owns(k)).collect()
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Read and parse a JSON record; missing and corrupt records are `None`.
pub(crate) fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            let corrupt = CacheError::CorruptRecord {
                key: key.to_string(),
                reason: e.to_string(),
            };
            warn!("{}, treating as a cache miss", corrupt);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_key_layout() {
        let keys = CacheKeys::default();
        assert_eq!(keys.file_list("a/b/"), "r2_image_hosting_files_a/b/");
        assert_eq!(keys.file_list(""), "r2_image_hosting_files_");
        assert_eq!(keys.urls(), "r2_image_hosting_urls");
        assert_eq!(keys.timestamp(), "r2_image_hosting_timestamp");
        assert_eq!(keys.bucket_tree(), "r2_image_hosting_bucket_tree");
        assert_eq!(keys.all_files(), "r2_image_hosting_all_files");
        assert!(keys.is_file_list(&keys.file_list("x")));
        assert!(!keys.is_file_list(&keys.all_files()));
        assert!(!keys.owns("s3ConfigData"));
    }

    #[test]
    fn test_owned_keys_skip_foreign_data() {
        let keys = CacheKeys::new("ns_");
        let mut store = MemoryStore::new();
        store.set("ns_urls", "{}").unwrap();
        store.set("other_app", "1").unwrap();
        assert_eq!(keys.owned_keys(&store), vec!["ns_urls"]);
    }

    #[test]
    fn test_read_json_degrades() {
        let mut store = MemoryStore::new();
        store.set("good", "[1,2]").unwrap();
        store.set("bad", "{not json").unwrap();
        assert_eq!(read_json::<Vec<u32>, _>(&store, "good"), Some(vec![1, 2]));
        assert_eq!(read_json::<Vec<u32>, _>(&store, "bad"), None);
        assert_eq!(read_json::<Vec<u32>, _>(&store, "missing"), None);
    }
}
