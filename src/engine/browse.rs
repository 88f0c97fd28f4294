//! Read-side queries. None of these touch the remote store or fail.

use crate::engine::MirrorCache;
use crate::fs::index::{self, IndexSummary};
use crate::fs::path::normalize_prefix;
use crate::fs::{FileEntry, TreeNode};
use crate::storage::KeyValueStore;

impl<S: KeyValueStore> MirrorCache<S> {
    /// Root of the mirrored tree.
    pub fn get_tree(&self) -> &TreeNode {
        self.tree.root()
    }

    /// Get the folder node at `path` ("" is the root).
    pub fn get_node(&self, path: &str) -> Option<&TreeNode> {
        self.tree.lookup(path)
    }

    /// List the contents of `path`.
    ///
    /// The stored snapshot wins when present. Otherwise the listing is
    /// rebuilt from the tree: the node's files followed by its child
    /// folders. Unknown paths yield an empty list.
    pub fn get_files_in_path(&self, path: &str) -> Vec<FileEntry> {
        if let Some(entries) = self.snapshots.get(&self.store, &normalize_prefix(path)) {
            return entries;
        }
        self.tree.list_children_as_entries(path).unwrap_or_default()
    }

    /// Every known file, in tree pre-order.
    pub fn all_files(&self) -> &[FileEntry] {
        &self.all_files
    }

    /// Files whose name or key contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&FileEntry> {
        index::search(&self.all_files, query)
    }

    pub fn index_summary(&self) -> IndexSummary {
        IndexSummary::of(&self.all_files)
    }

    /// Check if the last refresh is older than the configured TTL.
    pub fn is_stale(&self) -> bool {
        self.snapshots.is_stale(&self.store, Self::now())
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::MirrorCache;
    use crate::fs::FileEntry;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn test_files_then_folders_from_tree() {
        let mut cache = MirrorCache::new(MemoryStore::new());
        cache.merge(
            "",
            &[FileEntry::folder("docs/"), FileEntry::file("readme.md", 9, None)],
        );

        let names: Vec<String> = cache
            .get_files_in_path("")
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["readme.md", "docs/"]);
    }

    #[test]
    fn test_snapshot_takes_precedence() {
        let mut cache = MirrorCache::new(MemoryStore::new());
        let listing = vec![FileEntry::folder("docs/"), FileEntry::file("readme.md", 9, None)];
        cache.record_listing("", &listing);

        // Snapshot keeps the listing order: folders first.
        assert_eq!(cache.get_files_in_path(""), listing);
        assert_eq!(cache.get_files_in_path("/"), listing);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_tree() {
        let mut store = MemoryStore::new();
        store.set("r2_image_hosting_files_docs/", "not json").unwrap();
        let mut cache = MirrorCache::new(store);
        cache.merge("docs", &[FileEntry::file("docs/a.txt", 1, None)]);

        let entries = cache.get_files_in_path("docs/");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "docs/a.txt");
        assert!(cache.get_files_in_path("missing/").is_empty());
    }

    #[test]
    fn test_search_and_summary() {
        let mut cache = MirrorCache::new(MemoryStore::new());
        cache.merge(
            "img",
            &[
                FileEntry::file("img/Cat.png", 10, None),
                FileEntry::file("img/dog.jpg", 20, None),
            ],
        );
        let hits: Vec<&str> = cache.search("cat").iter().map(|f| f.key.as_str()).collect();
        assert_eq!(hits, vec!["img/Cat.png"]);
        assert_eq!(cache.index_summary().total_bytes, 30);
        assert_eq!(cache.index_summary().file_count, 2);
    }
}
