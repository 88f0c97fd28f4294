//! Key and path normalization.
//!
//! Object stores have no directories, only keys. These helpers turn a
//! delimiter-based listing into [`FileEntry`] records and keep path strings
//! in one canonical form: no leading `/`, no repeated `/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fs::node::FileEntry;

/// Raw object from a listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Collapse repeated `/` and strip a single leading `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut result = String::with_capacity(prefix.len());
    let mut prev_slash = false;
    for c in prefix.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        result.push(c);
    }
    match result.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => result,
    }
}

/// Convert a listing response into entries, folders first.
///
/// Objects whose key equals `normalized_prefix` are dropped; some stores
/// return the prefix itself as a zero-byte object.
pub fn to_file_entries(
    common_prefixes: &[String],
    contents: &[ObjectSummary],
    normalized_prefix: &str,
) -> Vec<FileEntry> {
    let folders = common_prefixes.iter().map(|prefix| {
        let key = collapse_slashes(prefix);
        FileEntry::folder(key)
    });

    let files = contents
        .iter()
        .filter(|item| item.key != normalized_prefix)
        .map(|item| FileEntry::file(item.key.clone(), item.size, item.last_modified));

    folders.chain(files).collect()
}

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Canonical tree path for a listing path (`"a/b/"` -> `"a/b"`).
pub fn tree_path(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

/// Path of a child folder under `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn collapse_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
