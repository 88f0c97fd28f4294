//! Remote listing seam.
//!
//! The engine never talks to an object store directly. It consumes a
//! [`RemoteLister`], which yields normalized entries for one path. Raw S3-style
//! clients can implement [`ObjectStore`] instead and be wrapped in a
//! [`StoreLister`], which applies prefix normalization and entry conversion.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::fs::path::{ObjectSummary, normalize_prefix, to_file_entries};
use crate::fs::FileEntry;

/// Delimiter used for folder-style listings.
pub const DELIMITER: &str = "/";

/// Lists one path of the remote namespace.
///
/// Implementations return folders flagged `is_folder` and files with size
/// and modification time populated. Network or permission failures are
/// reported as [`crate::CacheError::Transport`].
pub trait RemoteLister {
    fn list(&self, path: &str) -> impl Future<Output = Result<Vec<FileEntry>>> + Send;
}

/// Response of a delimiter-based listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Synthetic folders, e.g. `photos/2024/`
    pub common_prefixes: Vec<String>,
    /// Objects directly under the prefix
    pub contents: Vec<ObjectSummary>,
}

/// Raw object-store client capable of a delimiter-based listing.
pub trait ObjectStore {
    fn list_objects(
        &self,
        prefix: &str,
        delimiter: &str,
    ) -> impl Future<Output = Result<RawListing>> + Send;
}

/// Adapts an [`ObjectStore`] into a [`RemoteLister`].
#[derive(Debug, Clone)]
pub struct StoreLister<S> {
    store: S,
}

impl<S: ObjectStore> StoreLister<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S: ObjectStore + Sync> RemoteLister for StoreLister<S> {
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>> {
        let prefix = normalize_prefix(path);
        let listing = self.store.list_objects(&prefix, DELIMITER).await?;
        debug!(
            prefix = %prefix,
            folders = listing.common_prefixes.len(),
            objects = listing.contents.len(),
            "listed remote prefix"
        );
        Ok(to_file_entries(
            &listing.common_prefixes,
            &listing.contents,
            &prefix,
        ))
    }
}
