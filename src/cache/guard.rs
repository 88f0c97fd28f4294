//! Recovery from rejected persistence writes.
//!
//! The policy is coarse and has two stages: drop the signed URL cache and
//! retry, then wipe the whole namespace and retry once more. Callers that
//! receive a [`WriteOutcome`] with [`WriteOutcome::wiped`] set must reset
//! their in-memory state.

use tracing::{error, warn};

use crate::cache::CacheKeys;
use crate::storage::KeyValueStore;

/// Result of a guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriteOutcome {
    /// First attempt succeeded.
    Stored,
    /// Succeeded after the URL cache was evicted.
    StoredAfterEviction,
    /// Succeeded after the namespace was wiped.
    StoredAfterWipe,
    /// Still rejected after the wipe; the value was not persisted.
    Dropped,
}

impl WriteOutcome {
    /// Check if the value reached the store.
    pub fn is_stored(self) -> bool {
        !matches!(self, WriteOutcome::Dropped)
    }

    /// Check if the namespace was wiped while writing.
    pub fn wiped(self) -> bool {
        matches!(self, WriteOutcome::StoredAfterWipe | WriteOutcome::Dropped)
    }

    /// Combine the outcomes of consecutive writes, keeping the most severe.
    pub fn then(self, next: WriteOutcome) -> WriteOutcome {
        self.max(next)
    }
}

/// Storage budget guard for one namespace.
#[derive(Debug, Clone)]
pub struct StorageGuard {
    keys: CacheKeys,
}

impl StorageGuard {
    pub fn new(keys: CacheKeys) -> Self {
        Self { keys }
    }

    /// Write `value` at `key`, running the eviction cascade on failure.
    pub fn write<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        key: &str,
        value: &str,
    ) -> WriteOutcome {
        let Err(e) = store.set(key, value) else {
            return WriteOutcome::Stored;
        };
        warn!(key, error = %e, bytes = value.len(), "write rejected, evicting URL cache");

        let url_key = self.keys.urls();
        match store.remove(&url_key) {
            Ok(()) => match store.set(key, value) {
                Ok(()) => return WriteOutcome::StoredAfterEviction,
                Err(e) => warn!(key, error = %e, "write still rejected after URL cache eviction"),
            },
            Err(e) => warn!(key = %url_key, error = %e, "URL cache eviction failed"),
        }

        let removed = self.wipe(store);
        warn!(key, removed, "namespace wiped to recover storage");

        match store.set(key, value) {
            Ok(()) => WriteOutcome::StoredAfterWipe,
            Err(e) => {
                error!(key, error = %e, "write dropped after full wipe");
                WriteOutcome::Dropped
            }
        }
    }

    /// Remove every key in the namespace, returning how many were removed.
    pub fn wipe<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> usize {
        let mut removed = 0;
        for key in self.keys.owned_keys(&*store) {
            match store.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => error!(key = %key, error = %e, "failed to remove cache record"),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::testing::{Op, RejectingStore};

    fn guard() -> StorageGuard {
        StorageGuard::new(CacheKeys::new("ns_"))
    }

    #[test]
    fn test_plain_write() {
        let mut store = MemoryStore::new();
        assert_eq!(guard().write(&mut store, "ns_a", "1"), WriteOutcome::Stored);
        assert_eq!(store.get("ns_a").as_deref(), Some("1"));
    }

    #[test]
    fn test_url_cache_evicted_first() {
        let mut store = MemoryStore::with_quota(60);
        store.set("ns_urls", "{\"k\":\"u\"}").unwrap();
        store.set("ns_keep", "x").unwrap();

        let outcome = guard().write(&mut store, "ns_tree", "0123");
        assert_eq!(outcome, WriteOutcome::StoredAfterEviction);
        assert!(store.get("ns_urls").is_none());
        assert_eq!(store.get("ns_keep").as_deref(), Some("x"));
        assert_eq!(store.get("ns_tree").as_deref(), Some("0123"));
    }

    #[test]
    fn test_escalates_to_wipe_and_spares_foreign_keys() {
        let mut store = MemoryStore::with_quota(60);
        store.set("ns_a", "aaaa").unwrap();
        store.set("ns_b", "bbbb").unwrap();
        store.set("other", "o").unwrap();

        let outcome = guard().write(&mut store, "ns_big", "0123456789");
        assert_eq!(outcome, WriteOutcome::StoredAfterWipe);
        assert!(outcome.wiped());
        assert_eq!(store.keys(), vec!["ns_big", "other"]);
    }

    #[test]
    fn test_always_failing_store() {
        let mut store = RejectingStore::default();
        store.data.insert("ns_urls".to_string(), "{}".to_string());
        store.data.insert("ns_files_".to_string(), "[]".to_string());

        let outcome = guard().write(&mut store, "ns_tree", "{}");
        assert_eq!(outcome, WriteOutcome::Dropped);
        assert!(!outcome.is_stored());

        assert_eq!(
            store.ops(),
            vec![
                Op::Set("ns_tree".to_string()),
                Op::Remove("ns_urls".to_string()),
                Op::Set("ns_tree".to_string()),
                Op::Remove("ns_files_".to_string()),
                Op::Set("ns_tree".to_string()),
            ]
        );
    }

    #[test]
    fn test_outcome_combination() {
        use WriteOutcome::*;
        assert_eq!(Stored.then(StoredAfterEviction), StoredAfterEviction);
        assert_eq!(StoredAfterWipe.then(Stored), StoredAfterWipe);
        assert!(Stored.then(Dropped).wiped());
    }
}
