//! Listing entries and tree nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name and path of the tree root.
pub const ROOT_NAME: &str = "root";

/// One object or synthetic folder from a delimiter-based listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Full object key (folders end with `/`)
    pub key: String,
    /// Last key segment; folders carry a trailing `/`
    pub name: String,
    /// Whether this entry is a common prefix rather than an object
    pub is_folder: bool,
    /// Object size in bytes (0 for folders)
    pub size: u64,
    /// Last modification time (absent for folders)
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Create a regular file entry.
    pub fn file(
        key: impl Into<String>,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let key = key.into();
        let name = key.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            key,
            name,
            is_folder: false,
            size,
            last_modified,
        }
    }

    /// Create a folder entry from its full prefix (e.g. `photos/2024/`).
    pub fn folder(prefix: impl Into<String>) -> Self {
        let key = prefix.into();
        let last = key.split('/').filter(|s| !s.is_empty()).next_back();
        Self {
            name: format!("{}/", last.unwrap_or_default()),
            key,
            is_folder: true,
            size: 0,
            last_modified: None,
        }
    }

    /// Folder name without its trailing `/`.
    pub fn folder_name(&self) -> &str {
        self.name.trim_end_matches('/')
    }
}

/// A folder in the mirrored hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub children: Vec<TreeNode>,
    pub files: Vec<FileEntry>,
}

impl TreeNode {
    /// Create an empty root node.
    pub fn root() -> Self {
        Self::new(ROOT_NAME, "")
    }

    /// Create an empty folder node.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Check if this node is the tree root.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Check if this node has neither files nor children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.files.is_empty()
    }

    /// Find a direct child folder by name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Return the child with `name`, appending a new one at `path` if absent.
    ///
    /// An existing child is returned untouched, so previously synced
    /// subtrees survive rediscovery.
    pub(crate) fn child_or_insert(&mut self, name: &str, path: String) -> &mut TreeNode {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(TreeNode::new(name, path));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Synthesize the folder entry a listing of the parent would return.
    pub fn as_folder_entry(&self) -> FileEntry {
        FileEntry {
            key: format!("{}/", self.path),
            name: format!("{}/", self.name),
            is_folder: true,
            size: 0,
            last_modified: None,
        }
    }

    /// Count folders in this subtree, including this node.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::root()
    }
}
