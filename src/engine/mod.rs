//! The cache engine: tree mirror, snapshots, and flat index over one store.
//!
//! [`MirrorCache`] owns all mutable state. Operations are split across
//! submodules by concern (browsing, merging, refreshing, settings), each
//! adding an `impl` block.

mod browse;
mod merge;
mod refresh;
mod settings;

pub use refresh::{SyncReport, SyncStatus};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{CacheKeys, SnapshotCache, StorageGuard, WriteOutcome, read_json};
use crate::config::EngineConfig;
use crate::fs::{FileEntry, TreeMirror, TreeNode};
use crate::storage::KeyValueStore;

/// Local mirror of a remote bucket backed by a [`KeyValueStore`].
///
/// All reads are served from memory or the store and never fail; only
/// refreshes touch the remote side.
#[derive(Debug)]
pub struct MirrorCache<S> {
    store: S,
    config: EngineConfig,
    keys: CacheKeys,
    snapshots: SnapshotCache,
    guard: StorageGuard,
    tree: TreeMirror,
    all_files: Vec<FileEntry>,
}

impl<S: KeyValueStore> MirrorCache<S> {
    /// Open an engine with default settings.
    pub fn new(store: S) -> Self {
        Self::open(store, EngineConfig::default())
    }

    /// Open an engine, loading the persisted tree and flat index.
    ///
    /// Missing or corrupt records start out empty.
    pub fn open(store: S, config: EngineConfig) -> Self {
        let keys = CacheKeys::new(config.namespace.clone());
        let tree = read_json::<TreeNode, _>(&store, &keys.bucket_tree())
            .map(TreeMirror::from_root)
            .unwrap_or_default();
        let all_files = read_json(&store, &keys.all_files()).unwrap_or_default();
        info!(
            namespace = %keys.namespace(),
            folders = tree.root().node_count(),
            "cache engine opened"
        );

        Self {
            snapshots: SnapshotCache::new(keys.clone(), config.ttl),
            guard: StorageGuard::new(keys.clone()),
            store,
            config,
            keys,
            tree,
            all_files,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// Write a namespaced record through the storage guard.
    pub(crate) fn persist(&mut self, key: &str, value: &str) -> WriteOutcome {
        let outcome = self.guard.write(&mut self.store, key, value);
        self.absorb(outcome);
        outcome
    }

    /// Reset in-memory state if a write had to wipe the namespace.
    pub(crate) fn absorb(&mut self, outcome: WriteOutcome) {
        if !outcome.wiped() {
            return;
        }
        warn!("storage wiped, resetting in-memory mirror");
        self.tree.reset();
        self.all_files.clear();
        // Best effort: keep the store consistent with memory.
        let reset = [
            (self.keys.bucket_tree(), self.tree_json()),
            (self.keys.all_files(), "[]".to_string()),
        ];
        for (key, value) in reset {
            if let Err(e) = self.store.set(&key, &value) {
                debug!(key = %key, error = %e, "could not persist reset state");
            }
        }
    }

    pub(crate) fn tree_json(&self) -> String {
        serde_json::to_string(self.tree.root()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Persist the tree as a single blob.
    pub(crate) fn persist_tree(&mut self) -> WriteOutcome {
        let json = self.tree_json();
        let key = self.keys.bucket_tree();
        self.persist(&key, &json)
    }

    /// Recompute the flat index from the tree and persist it.
    pub(crate) fn refresh_index(&mut self) -> WriteOutcome {
        self.all_files = crate::fs::index::project(self.tree.root());
        let json = match serde_json::to_string(&self.all_files) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize flat index");
                return WriteOutcome::Dropped;
            }
        };
        let key = self.keys.all_files();
        self.persist(&key, &json)
    }
}
