//! Synchronous, quota-limited string storage.
//!
//! [`KeyValueStore`] is the engine's only durability primitive. Values are
//! JSON text; parsing and corruption handling happen in the layers above.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// Estimated footprint of one record (2 bytes per character).
pub fn estimate_bytes(key: &str, value: &str) -> usize {
    (key.chars().count() + value.chars().count()) * 2
}

/// A string key-value store with a storage budget.
pub trait KeyValueStore {
    /// Read a value; unreadable or missing records are `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, failing with [`crate::CacheError::QuotaExceeded`] when
    /// the store is full.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// All keys currently stored.
    fn keys(&self) -> Vec<String>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use super::KeyValueStore;
    use crate::error::{CacheError, Result};

    /// Operation recorded by [`RejectingStore`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Op {
        Set(String),
        Remove(String),
    }

    /// Store whose writes always fail, recording every mutation attempt.
    #[derive(Debug, Default, Clone)]
    pub struct RejectingStore {
        pub data: BTreeMap<String, String>,
        pub ops: Arc<Mutex<Vec<Op>>>,
    }

    impl RejectingStore {
        pub fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl KeyValueStore for RejectingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.data.get(key).cloned()
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<()> {
            self.ops.lock().unwrap().push(Op::Set(key.to_string()));
            Err(CacheError::QuotaExceeded {
                key: key.to_string(),
            })
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.ops.lock().unwrap().push(Op::Remove(key.to_string()));
            self.data.remove(key);
            Ok(())
        }

        fn keys(&self) -> Vec<String> {
            self.data.keys().cloned().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_bytes() {
        assert_eq!(estimate_bytes("", ""), 0);
        assert_eq!(estimate_bytes("ab", "cde"), 10);
        // Counted per character, not per UTF-8 byte
        assert_eq!(estimate_bytes("键", "值"), 4);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.keys(), vec!["k".to_string()]);
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
    }
}
