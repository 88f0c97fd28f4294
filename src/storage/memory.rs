//! In-memory store with an optional byte budget.

use std::collections::BTreeMap;

use crate::error::{CacheError, Result};
use crate::storage::{KeyValueStore, estimate_bytes};

/// Map-backed store. With a quota set, writes that would push the estimated
/// footprint past the budget are rejected.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store limited to `quota` estimated bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            data: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    /// Estimated bytes currently used.
    pub fn used(&self) -> usize {
        self.data.iter().map(|(k, v)| estimate_bytes(k, v)).sum()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let replaced = self
                .data
                .get(key)
                .map(|old| estimate_bytes(key, old))
                .unwrap_or(0);
            let projected = self.used() - replaced + estimate_bytes(key, value);
            if projected > quota {
                return Err(CacheError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}
