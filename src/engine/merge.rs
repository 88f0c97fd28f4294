//! Writing listings into the tree, snapshots, and flat index.

use tracing::debug;

use crate::engine::MirrorCache;
use crate::fs::FileEntry;
use crate::fs::path::normalize_prefix;
use crate::storage::KeyValueStore;

impl<S: KeyValueStore> MirrorCache<S> {
    /// Merge the listing of `path` into the tree, then persist the tree and
    /// recompute the flat index.
    ///
    /// Re-merging the same listing leaves the tree unchanged.
    pub fn merge(&mut self, path: &str, entries: &[FileEntry]) {
        self.tree.merge(path, entries);
        debug!(path, entries = entries.len(), "merged listing into tree");
        self.persist_tree();
        self.refresh_index();
    }

    /// Store a fresh listing of `path` as a snapshot and merge it into the
    /// tree.
    pub fn record_listing(&mut self, path: &str, entries: &[FileEntry]) {
        let path = normalize_prefix(path);
        let outcome = self.snapshots.put(
            &mut self.store,
            &self.guard,
            &path,
            entries,
            Self::now(),
        );
        self.absorb(outcome);
        self.merge(&path, entries);
    }

    /// Replace the tree with an empty root and persist it.
    pub fn reset(&mut self) {
        self.tree.reset();
        self.persist_tree();
        self.refresh_index();
    }

    /// Remove every record in the namespace and empty the mirror.
    pub fn clear_all(&mut self) {
        let removed = self.guard.wipe(&mut self.store);
        self.tree.reset();
        self.all_files.clear();
        debug!(removed, "cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::MirrorCache;
    use crate::fs::{FileEntry, TreeNode};
    use crate::storage::{FileStore, KeyValueStore, MemoryStore};

    fn file(key: &str) -> FileEntry {
        FileEntry::file(key, 1, None)
    }

    #[test]
    fn test_merge_scenario() {
        let mut cache = MirrorCache::new(MemoryStore::new());
        cache.merge("a/b", &[file("a/b/x.png")]);

        let a = cache.get_node("a").unwrap();
        assert_eq!(a.path, "a");
        assert!(a.files.is_empty());
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].name, "b");

        let b = cache.get_node("a/b").unwrap();
        assert_eq!(b.path, "a/b");
        assert_eq!(b.files, vec![file("a/b/x.png")]);
        assert_eq!(cache.all_files(), &[file("a/b/x.png")]);
    }

    #[test]
    fn test_record_listing_writes_snapshot_and_tree() {
        let mut cache = MirrorCache::new(MemoryStore::new());
        let entries = vec![FileEntry::folder("docs/"), file("readme.md")];
        cache.record_listing("/", &entries);

        assert_eq!(
            cache.store().get("r2_image_hosting_files_").as_deref(),
            Some(serde_json::to_string(&entries).unwrap().as_str())
        );
        assert!(cache.store().get("r2_image_hosting_timestamp").is_some());
        assert!(cache.get_node("docs").is_some());
        assert!(!cache.is_stale());
    }

    #[test]
    fn test_clear_all_keeps_foreign_keys() {
        let mut store = MemoryStore::new();
        store.set("s3ConfigData", "e30=").unwrap();
        let mut cache = MirrorCache::new(store);
        cache.record_listing("", &[file("readme.md")]);
        cache.save_file_urls(&[("readme.md".to_string(), "https://x".to_string())].into());

        cache.clear_all();

        assert_eq!(cache.store().keys(), vec!["s3ConfigData"]);
        assert_eq!(cache.get_tree(), &TreeNode::root());
        assert!(cache.get_files_in_path("").is_empty());
        assert!(cache.is_stale());
    }

    #[test]
    fn test_reset_persists_empty_root() {
        let mut cache = MirrorCache::new(MemoryStore::new());
        cache.merge("a", &[file("a/x")]);
        cache.reset();

        let reopened = MirrorCache::new(cache.into_store());
        assert_eq!(reopened.get_tree(), &TreeNode::root());
        assert!(reopened.all_files().is_empty());
    }

    #[test]
    fn test_deep_listing_on_disk_keeps_other_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = MirrorCache::new(FileStore::open(dir.path()).unwrap());
        cache.record_listing("", &[FileEntry::folder("docs/")]);
        cache.record_listing("docs/", &[file("docs/a.txt")]);

        let deep = format!("{}/", "d".repeat(200));
        let entries = vec![file(&format!("{}x.png", deep))];
        cache.record_listing(&deep, &entries);

        assert_eq!(cache.get_node("docs").unwrap().files.len(), 1);
        assert_eq!(cache.get_files_in_path(&deep), entries);
        assert!(cache.store().get("r2_image_hosting_timestamp").is_some());
        assert_eq!(cache.all_files().len(), 2);

        let reopened = MirrorCache::new(FileStore::open(dir.path()).unwrap());
        assert_eq!(reopened.get_files_in_path(&deep), entries);
        assert!(reopened.get_node(&deep).is_some());
    }
}
