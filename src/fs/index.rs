//! Flat file index projected from the tree.

use serde::Serialize;

use crate::fs::node::{FileEntry, TreeNode};

/// Every file in the tree, in pre-order: a node's own files, then its
/// children in insertion order.
pub fn project(root: &TreeNode) -> Vec<FileEntry> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.extend(node.files.iter().cloned());
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Case-insensitive substring search over file names and keys.
pub fn search<'a>(index: &'a [FileEntry], query: &str) -> Vec<&'a FileEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return index.iter().collect();
    }
    index
        .iter()
        .filter(|f| {
            f.name.to_lowercase().contains(&needle) || f.key.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Aggregate figures over the flat index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub file_count: usize,
    pub total_bytes: u64,
}

impl IndexSummary {
    pub fn of(index: &[FileEntry]) -> Self {
        Self {
            file_count: index.len(),
            total_bytes: index.iter().map(|f| f.size).sum(),
        }
    }
}
