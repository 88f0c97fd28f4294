//! Per-path listing snapshots with one global freshness timestamp.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::{CacheKeys, StorageGuard, WriteOutcome, read_json};
use crate::fs::FileEntry;
use crate::storage::KeyValueStore;

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Best-effort cache of listing results keyed by path.
///
/// Snapshots are never the source of truth; the tree is. A missing or
/// unparsable snapshot is a miss, and a write that cannot be persisted is
/// dropped after the storage guard has done what it can.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    keys: CacheKeys,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(keys: CacheKeys, ttl: Duration) -> Self {
        Self { keys, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read the snapshot stored for `path`.
    pub fn get<S: KeyValueStore + ?Sized>(&self, store: &S, path: &str) -> Option<Vec<FileEntry>> {
        read_json(store, &self.keys.file_list(path))
    }

    /// Store the snapshot for `path` and refresh the global timestamp.
    pub fn put<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        guard: &StorageGuard,
        path: &str,
        entries: &[FileEntry],
        now: DateTime<Utc>,
    ) -> WriteOutcome {
        let stamped = self.touch(store, guard, now);

        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(path, error = %e, "failed to serialize listing snapshot");
                return stamped;
            }
        };
        let outcome = guard.write(store, &self.keys.file_list(path), &json);
        if !outcome.is_stored() {
            warn!(path, "listing snapshot dropped");
        } else {
            debug!(path, entries = entries.len(), "listing snapshot stored");
        }
        stamped.then(outcome)
    }

    /// Set the global timestamp to `now`.
    pub fn touch<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        guard: &StorageGuard,
        now: DateTime<Utc>,
    ) -> WriteOutcome {
        guard.write(
            store,
            &self.keys.timestamp(),
            &now.timestamp_millis().to_string(),
        )
    }

    /// Time of the last snapshot write, if any.
    pub fn last_refresh<S: KeyValueStore + ?Sized>(&self, store: &S) -> Option<DateTime<Utc>> {
        let raw = store.get(&self.keys.timestamp())?;
        let millis = raw.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp_millis(millis)
    }

    /// Check if the cache as a whole is older than the TTL.
    ///
    /// A missing or unreadable timestamp counts as stale.
    pub fn is_stale<S: KeyValueStore + ?Sized>(&self, store: &S, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_refresh(store) else {
            return true;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed > self.ttl,
            // Timestamp in the future: treat as fresh.
            Err(_) => false,
        }
    }
}
