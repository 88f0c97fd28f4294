//! Full bucket refresh: a depth-bounded, sequential walk of the remote
//! namespace.

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::MirrorCache;
use crate::error::{CacheError, Result};
use crate::progress::{ProgressCallback, SyncProgress};
use crate::remote::RemoteLister;
use crate::storage::KeyValueStore;

/// How much of the namespace a finished refresh covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    /// Every discovered folder was listed.
    Complete,
    /// Some folders sat below the depth bound and were skipped.
    Partial,
}

/// Summary of a finished refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub status: SyncStatus,
    /// Number of paths listed and merged
    pub listed_paths: usize,
    /// Files discovered across all listings
    pub file_count: usize,
    /// Folder paths skipped by the depth bound
    pub pruned: Vec<String>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.status == SyncStatus::Complete
    }
}

impl<S: KeyValueStore> MirrorCache<S> {
    /// Rebuild the mirror from the remote store.
    ///
    /// See [`MirrorCache::refresh_all_with_progress`].
    pub async fn refresh_all<L: RemoteLister>(&mut self, lister: &L) -> Result<SyncReport> {
        self.refresh_all_with_progress(lister, None).await
    }

    /// Rebuild the mirror from the remote store, reporting each listed path.
    ///
    /// The tree is reset, then every folder is listed depth-first starting
    /// at the bucket root, one path at a time. Each listing is written to
    /// its snapshot and merged before the next request goes out. Folders
    /// deeper than `max_depth` are skipped with a warning and the report is
    /// marked [`SyncStatus::Partial`].
    ///
    /// The refresh is not transactional. If a listing fails, everything
    /// merged so far stays committed and [`CacheError::SyncFailed`] reports
    /// the failing path. Calling again is safe.
    pub async fn refresh_all_with_progress<L: RemoteLister>(
        &mut self,
        lister: &L,
        mut progress: Option<ProgressCallback>,
    ) -> Result<SyncReport> {
        let outcome = self
            .snapshots
            .touch(&mut self.store, &self.guard, Self::now());
        self.absorb(outcome);
        self.reset();

        let max_depth = self.config.max_depth;
        let mut report = SyncReport {
            status: SyncStatus::Complete,
            listed_paths: 0,
            file_count: 0,
            pruned: Vec::new(),
        };

        // Depth-tagged worklist; children are pushed in reverse so they pop
        // in listing order.
        let mut pending: Vec<(String, usize)> = vec![(String::new(), 0)];
        while let Some((path, depth)) = pending.pop() {
            if depth > max_depth {
                let pruned = CacheError::DepthExceeded {
                    path: path.clone(),
                    depth: max_depth,
                };
                warn!(path = %path, depth, "{}", pruned);
                report.status = SyncStatus::Partial;
                report.pruned.push(path);
                continue;
            }

            let entries = match lister.list(&path).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path, error = %e, listed = report.listed_paths, "refresh aborted");
                    return Err(CacheError::SyncFailed {
                        path,
                        listed: report.listed_paths,
                        source: Box::new(e),
                    });
                }
            };

            self.record_listing(&path, &entries);
            report.listed_paths += 1;
            report.file_count += entries.iter().filter(|e| !e.is_folder).count();

            if let Some(callback) = progress.as_mut() {
                callback(&SyncProgress::new(
                    report.listed_paths,
                    report.file_count,
                    path.as_str(),
                    depth,
                ));
            }

            pending.extend(
                entries
                    .iter()
                    .rev()
                    .filter(|e| e.is_folder)
                    .map(|folder| (folder.key.clone(), depth + 1)),
            );
        }

        info!(
            listed = report.listed_paths,
            files = report.file_count,
            pruned = report.pruned.len(),
            "refresh finished"
        );
        Ok(report)
    }
}
