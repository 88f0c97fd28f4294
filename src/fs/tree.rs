//! Incremental folder tree built from per-path listings.

use serde::{Deserialize, Serialize};

use crate::fs::node::{FileEntry, TreeNode};
use crate::fs::path::{child_path, segments};

/// Hierarchical mirror of a flat key namespace.
///
/// Nodes are only ever added by [`TreeMirror::merge`]; the only way to
/// drop them is [`TreeMirror::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeMirror {
    root: TreeNode,
}

impl TreeMirror {
    /// Create a mirror holding only an empty root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a previously persisted root node.
    pub fn from_root(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Merge the listing of `path` into the tree.
    ///
    /// Missing ancestors are created on the way down. The node's `files`
    /// are replaced by the non-folder entries; folder entries only ensure a
    /// child exists and never touch an existing child's contents.
    pub fn merge(&mut self, path: &str, entries: &[FileEntry]) {
        let mut current = &mut self.root;
        let mut current_path = String::new();
        for segment in segments(path) {
            current_path = child_path(&current_path, segment);
            current = current.child_or_insert(segment, current_path.clone());
        }

        current.files = entries.iter().filter(|e| !e.is_folder).cloned().collect();

        for folder in entries.iter().filter(|e| e.is_folder) {
            let name = folder.folder_name();
            if name.is_empty() {
                continue;
            }
            current.child_or_insert(name, child_path(&current_path, name));
        }
    }

    /// Find the node at `path`; the empty path is the root.
    pub fn lookup(&self, path: &str) -> Option<&TreeNode> {
        segments(path).try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Listing of `path` reconstructed from the tree: the node's files
    /// followed by one synthesized entry per child folder.
    pub fn list_children_as_entries(&self, path: &str) -> Option<Vec<FileEntry>> {
        let node = self.lookup(path)?;
        let mut entries = node.files.clone();
        entries.extend(node.children.iter().map(TreeNode::as_folder_entry));
        Some(entries)
    }

    /// Replace the tree with an empty root.
    pub fn reset(&mut self) {
        self.root = TreeNode::root();
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::path::tree_path;

    fn file(key: &str) -> FileEntry {
        FileEntry::file(key, 1, None)
    }

    fn assert_paths_consistent(node: &TreeNode, ancestors: &mut Vec<String>) {
        if !node.is_root() {
            ancestors.push(node.name.clone());
            assert_eq!(node.path, ancestors.join("/"));
        }
        for child in &node.children {
            assert_paths_consistent(child, ancestors);
        }
        if !node.is_root() {
            ancestors.pop();
        }
    }

    #[test]
    fn test_merge_creates_ancestors() {
        let mut tree = TreeMirror::new();
        tree.merge("a/b", &[file("a/b/x.png")]);

        let a = tree.lookup("a").unwrap();
        assert_eq!(a.path, "a");
        assert!(a.files.is_empty());
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].name, "b");

        let b = tree.lookup("a/b").unwrap();
        assert_eq!(b.path, "a/b");
        assert_eq!(b.files, vec![file("a/b/x.png")]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let entries = vec![
            FileEntry::folder("docs/"),
            FileEntry::folder("img/"),
            file("readme.md"),
        ];
        let mut once = TreeMirror::new();
        once.merge("", &entries);

        let mut twice = TreeMirror::new();
        twice.merge("", &entries);
        twice.merge("", &entries);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_folders_never_land_in_files() {
        let mut tree = TreeMirror::new();
        tree.merge("", &[FileEntry::folder("docs/"), file("readme.md")]);

        let root = tree.root();
        assert_eq!(root.files.len(), 1);
        assert!(root.files.iter().all(|f| !f.is_folder));
        assert!(root.child("docs").is_some());
    }

    #[test]
    fn test_rediscovered_folder_keeps_subtree() {
        let mut tree = TreeMirror::new();
        tree.merge("", &[FileEntry::folder("docs/")]);
        tree.merge("docs/", &[file("docs/a.txt")]);
        tree.merge("", &[FileEntry::folder("docs/"), file("readme.md")]);

        let docs = tree.lookup("docs").unwrap();
        assert_eq!(docs.files, vec![file("docs/a.txt")]);
    }

    #[test]
    fn test_files_are_replaced_not_appended() {
        let mut tree = TreeMirror::new();
        tree.merge("docs", &[file("docs/a.txt"), file("docs/b.txt")]);
        tree.merge("docs", &[file("docs/c.txt")]);
        assert_eq!(tree.lookup("docs").unwrap().files, vec![file("docs/c.txt")]);
    }

    #[test]
    fn test_trailing_slash_paths_stay_canonical() {
        let mut tree = TreeMirror::new();
        tree.merge("", &[FileEntry::folder("a/")]);
        tree.merge("a/", &[FileEntry::folder("a/b/")]);
        tree.merge("a/b/", &[FileEntry::folder("a/b/c/"), file("a/b/x.png")]);

        assert_eq!(tree.lookup("a/b/c").unwrap().path, "a/b/c");
        assert_eq!(tree_path("a/b/"), tree.lookup("a/b/").unwrap().path);
        assert_paths_consistent(tree.root(), &mut Vec::new());
    }

    #[test]
    fn test_lookup_missing_segment() {
        let mut tree = TreeMirror::new();
        tree.merge("a", &[]);
        assert!(tree.lookup("a/missing").is_none());
        assert!(tree.lookup("").unwrap().is_root());
    }

    #[test]
    fn test_list_children_files_then_folders() {
        let mut tree = TreeMirror::new();
        tree.merge("", &[FileEntry::folder("docs/"), file("readme.md")]);

        let entries = tree.list_children_as_entries("").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["readme.md", "docs/"]);
        assert_eq!(entries[1].key, "docs/");
        assert!(tree.list_children_as_entries("nope").is_none());
    }

    #[test]
    fn test_reset_and_serde_shape() {
        let mut tree = TreeMirror::new();
        tree.merge("a", &[file("a/x")]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["name"], "root");
        assert_eq!(json["path"], "");
        assert_eq!(json["children"][0]["name"], "a");

        tree.reset();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), &TreeNode::root());
    }
}
