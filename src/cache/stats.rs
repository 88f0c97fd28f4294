//! Cache usage statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheKeys;
use crate::storage::{KeyValueStore, estimate_bytes};

/// Estimated cache footprint, in bytes (2 bytes per character).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Keys and values of every namespaced record
    pub total_size: usize,
    /// Number of listing snapshots
    pub file_count: usize,
    /// Number of cached signed URLs
    pub url_count: usize,
    /// Serialized in-memory tree
    pub tree_size: usize,
}

impl CacheStats {
    /// Collect stats from `store`; `tree_json` is the serialized tree.
    ///
    /// Never fails: unreadable records simply contribute nothing.
    pub fn collect<S: KeyValueStore + ?Sized>(
        store: &S,
        keys: &CacheKeys,
        tree_json: Option<&str>,
    ) -> Self {
        let mut stats = CacheStats::default();
        let url_key = keys.urls();

        for key in keys.owned_keys(store) {
            let value = store.get(&key).unwrap_or_default();
            stats.total_size += estimate_bytes(&key, &value);
            if keys.is_file_list(&key) {
                stats.file_count += 1;
            }
            if key == url_key {
                stats.url_count = serde_json::from_str::<BTreeMap<String, String>>(&value)
                    .map(|urls| urls.len())
                    .unwrap_or(0);
            }
        }

        stats.tree_size = tree_json.map(|t| t.chars().count() * 2).unwrap_or(0);
        stats
    }

    /// Human-readable total size.
    pub fn total_size_display(&self) -> String {
        format_bytes(self.total_size as u64)
    }

    pub fn tree_size_display(&self) -> String {
        format_bytes(self.tree_size as u64)
    }
}

/// Format a byte count with 1024-based units, e.g. `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}
