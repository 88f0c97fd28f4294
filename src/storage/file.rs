//! Directory-backed store: one file per key.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::base64::{base64url_decode, base64url_encode};
use crate::error::{CacheError, Result};
use crate::storage::{KeyValueStore, estimate_bytes};

/// Longest file name used for a directly encoded key. Common filesystems
/// cap names at 255 bytes.
const MAX_NAME_LEN: usize = 200;

/// Subdirectory holding records whose encoded key is too long to be a
/// file name. Contains a `.`, so it never decodes as a key itself.
const HASHED_DIR: &str = "hashed.d";

/// Store that keeps each record in its own file under `dir`.
///
/// File names are the URL-safe base64 of the key, so any key (including
/// ones containing `/`) maps to a single flat file. Keys too long for that
/// are stored in a subdirectory by SHA-256 digest, with the encoded key
/// on the first line of the file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<usize>,
    used: usize,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let mut store = Self {
            dir,
            quota: None,
            used: 0,
        };
        store.used = store
            .keys()
            .iter()
            .filter_map(|k| store.get(k).map(|v| estimate_bytes(k, &v)))
            .sum();
        Ok(store)
    }

    /// Limit the store to `quota` estimated bytes.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Estimated bytes written through this handle and found at open.
    pub fn used(&self) -> usize {
        self.used
    }

    fn record_path(&self, key: &str) -> (PathBuf, Option<String>) {
        let name = base64url_encode(key.as_bytes());
        if name.len() <= MAX_NAME_LEN {
            return (self.dir.join(name), None);
        }
        let digest = Sha256::digest(key.as_bytes());
        let path = self.dir.join(HASHED_DIR).join(base64url_encode(&digest));
        (path, Some(name))
    }

    fn hashed_keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.dir.join(HASHED_DIR)) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let content = fs::read_to_string(entry.path()).ok()?;
                let (header, _) = content.split_once('\n')?;
                String::from_utf8(base64url_decode(header).ok()?).ok()
            })
            .collect()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let (path, header) = self.record_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "unreadable record treated as missing");
                return None;
            }
        };
        let Some(header) = header else {
            return Some(content);
        };
        match content.split_once('\n') {
            Some((stored, value)) if stored == header => Some(value.to_string()),
            _ => {
                warn!(key, path = %path.display(), "hashed record belongs to another key");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.get(key).map(|v| estimate_bytes(key, &v)).unwrap_or(0);
        let projected = self.used.saturating_sub(previous) + estimate_bytes(key, value);
        if let Some(quota) = self.quota {
            if projected > quota {
                return Err(CacheError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        let (path, header) = self.record_path(key);
        match header {
            None => fs::write(&path, value)?,
            Some(header) => {
                fs::create_dir_all(self.dir.join(HASHED_DIR))?;
                fs::write(&path, format!("{}\n{}", header, value))?;
            }
        }
        self.used = projected;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let size = self.get(key).map(|v| estimate_bytes(key, &v)).unwrap_or(0);
        let (path, _) = self.record_path(key);
        match fs::remove_file(path) {
            Ok(()) => {
                self.used = self.used.saturating_sub(size);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| {
                let name = entry.file_name();
                let bytes = base64url_decode(name.to_str()?).ok()?;
                String::from_utf8(bytes).ok()
            })
            .collect();
        keys.extend(self.hashed_keys());
        keys.sort();
        keys
    }
}
