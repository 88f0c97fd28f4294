//! Actor handle that owns a cache engine on a background task.
//!
//! [`MirrorCache`] has no internal locking. The handle gives it a single
//! writer: every call becomes a command processed in arrival order, so a
//! refresh can never interleave with another refresh or a merge.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::cache::CacheStats;
use crate::engine::{MirrorCache, SyncReport};
use crate::error::{CacheError, Result};
use crate::fs::{FileEntry, IndexSummary, TreeNode};
use crate::progress::ProgressCallback;
use crate::remote::RemoteLister;
use crate::storage::KeyValueStore;

#[derive(Clone)]
pub struct MirrorHandle {
    tx: mpsc::Sender<MirrorCommand>,
}

enum MirrorCommand {
    Tree {
        reply: oneshot::Sender<TreeNode>,
    },
    Node {
        path: String,
        reply: oneshot::Sender<Option<TreeNode>>,
    },
    FilesInPath {
        path: String,
        reply: oneshot::Sender<Vec<FileEntry>>,
    },
    AllFiles {
        reply: oneshot::Sender<Vec<FileEntry>>,
    },
    Search {
        query: String,
        reply: oneshot::Sender<Vec<FileEntry>>,
    },
    Summary {
        reply: oneshot::Sender<IndexSummary>,
    },
    IsStale {
        reply: oneshot::Sender<bool>,
    },
    Refresh {
        progress: Option<ProgressCallback>,
        reply: oneshot::Sender<Result<SyncReport>>,
    },
    Merge {
        path: String,
        entries: Vec<FileEntry>,
        reply: oneshot::Sender<()>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    ClearAll {
        reply: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
    SaveUserConfig {
        value: Value,
        reply: oneshot::Sender<bool>,
    },
    LoadUserConfig {
        reply: oneshot::Sender<Option<Value>>,
    },
    SaveUserSettings {
        value: Value,
        reply: oneshot::Sender<bool>,
    },
    LoadUserSettings {
        reply: oneshot::Sender<Option<Value>>,
    },
    SaveFileUrls {
        urls: BTreeMap<String, String>,
        reply: oneshot::Sender<bool>,
    },
    LoadFileUrls {
        reply: oneshot::Sender<BTreeMap<String, String>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

struct MirrorActor<S, L> {
    cache: MirrorCache<S>,
    lister: L,
    rx: mpsc::Receiver<MirrorCommand>,
}

impl MirrorHandle {
    /// Move `cache` onto a background task that refreshes through `lister`.
    ///
    /// Must be called within a Tokio runtime.
    pub fn spawn<S, L>(cache: MirrorCache<S>, lister: L) -> Self
    where
        S: KeyValueStore + Send + 'static,
        L: RemoteLister + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(64);
        let actor = MirrorActor { cache, lister, rx };
        tokio::spawn(actor.run());
        MirrorHandle { tx }
    }

    async fn request<R>(&self, build: impl FnOnce(oneshot::Sender<R>) -> MirrorCommand) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .await
            .map_err(|_| CacheError::Custom("Mirror actor stopped".to_string()))?;
        rx.await
            .map_err(|_| CacheError::Custom("Mirror actor stopped".to_string()))
    }

    pub async fn get_tree(&self) -> Result<TreeNode> {
        self.request(|reply| MirrorCommand::Tree { reply }).await
    }

    pub async fn get_node(&self, path: &str) -> Result<Option<TreeNode>> {
        self.request(|reply| MirrorCommand::Node {
            path: path.to_string(),
            reply,
        })
        .await
    }

    pub async fn get_files_in_path(&self, path: &str) -> Result<Vec<FileEntry>> {
        self.request(|reply| MirrorCommand::FilesInPath {
            path: path.to_string(),
            reply,
        })
        .await
    }

    pub async fn all_files(&self) -> Result<Vec<FileEntry>> {
        self.request(|reply| MirrorCommand::AllFiles { reply }).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<FileEntry>> {
        self.request(|reply| MirrorCommand::Search {
            query: query.to_string(),
            reply,
        })
        .await
    }

    pub async fn index_summary(&self) -> Result<IndexSummary> {
        self.request(|reply| MirrorCommand::Summary { reply }).await
    }

    pub async fn is_stale(&self) -> Result<bool> {
        self.request(|reply| MirrorCommand::IsStale { reply }).await
    }

    /// Refresh the whole mirror. Queued behind any command already sent.
    pub async fn refresh_all(&self) -> Result<SyncReport> {
        self.request(|reply| MirrorCommand::Refresh {
            progress: None,
            reply,
        })
        .await?
    }

    pub async fn refresh_all_with_progress(&self, progress: ProgressCallback) -> Result<SyncReport> {
        self.request(|reply| MirrorCommand::Refresh {
            progress: Some(progress),
            reply,
        })
        .await?
    }

    pub async fn merge(&self, path: &str, entries: Vec<FileEntry>) -> Result<()> {
        self.request(|reply| MirrorCommand::Merge {
            path: path.to_string(),
            entries,
            reply,
        })
        .await
    }

    /// Empty the tree and flat index, keeping snapshots and records.
    pub async fn reset(&self) -> Result<()> {
        self.request(|reply| MirrorCommand::Reset { reply }).await
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.request(|reply| MirrorCommand::ClearAll { reply }).await
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        self.request(|reply| MirrorCommand::Stats { reply }).await
    }

    pub async fn save_user_config(&self, value: Value) -> Result<bool> {
        self.request(|reply| MirrorCommand::SaveUserConfig { value, reply })
            .await
    }

    pub async fn load_user_config(&self) -> Result<Option<Value>> {
        self.request(|reply| MirrorCommand::LoadUserConfig { reply })
            .await
    }

    pub async fn save_user_settings(&self, value: Value) -> Result<bool> {
        self.request(|reply| MirrorCommand::SaveUserSettings { value, reply })
            .await
    }

    pub async fn load_user_settings(&self) -> Result<Option<Value>> {
        self.request(|reply| MirrorCommand::LoadUserSettings { reply })
            .await
    }

    /// Replace the signed URL cache.
    pub async fn save_file_urls(&self, urls: BTreeMap<String, String>) -> Result<bool> {
        self.request(|reply| MirrorCommand::SaveFileUrls { urls, reply })
            .await
    }

    pub async fn load_file_urls(&self) -> Result<BTreeMap<String, String>> {
        self.request(|reply| MirrorCommand::LoadFileUrls { reply })
            .await
    }

    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(MirrorCommand::Shutdown { reply: tx }).await;
        let _ = rx.await;
    }
}

impl<S, L> MirrorActor<S, L>
where
    S: KeyValueStore + Send + 'static,
    L: RemoteLister + Send + Sync + 'static,
{
    async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            if self.handle_command(cmd).await {
                break;
            }
        }
        debug!("mirror actor stopped");
    }

    async fn handle_command(&mut self, cmd: MirrorCommand) -> bool {
        match cmd {
            MirrorCommand::Tree { reply } => {
                let _ = reply.send(self.cache.get_tree().clone());
            }
            MirrorCommand::Node { path, reply } => {
                let _ = reply.send(self.cache.get_node(&path).cloned());
            }
            MirrorCommand::FilesInPath { path, reply } => {
                let _ = reply.send(self.cache.get_files_in_path(&path));
            }
            MirrorCommand::AllFiles { reply } => {
                let _ = reply.send(self.cache.all_files().to_vec());
            }
            MirrorCommand::Search { query, reply } => {
                let hits = self.cache.search(&query).into_iter().cloned().collect();
                let _ = reply.send(hits);
            }
            MirrorCommand::Summary { reply } => {
                let _ = reply.send(self.cache.index_summary());
            }
            MirrorCommand::IsStale { reply } => {
                let _ = reply.send(self.cache.is_stale());
            }
            MirrorCommand::Refresh { progress, reply } => {
                let res = self
                    .cache
                    .refresh_all_with_progress(&self.lister, progress)
                    .await;
                let _ = reply.send(res);
            }
            MirrorCommand::Merge {
                path,
                entries,
                reply,
            } => {
                self.cache.merge(&path, &entries);
                let _ = reply.send(());
            }
            MirrorCommand::Reset { reply } => {
                self.cache.reset();
                let _ = reply.send(());
            }
            MirrorCommand::ClearAll { reply } => {
                self.cache.clear_all();
                let _ = reply.send(());
            }
            MirrorCommand::Stats { reply } => {
                let _ = reply.send(self.cache.stats());
            }
            MirrorCommand::SaveUserConfig { value, reply } => {
                let _ = reply.send(self.cache.save_user_config(&value));
            }
            MirrorCommand::LoadUserConfig { reply } => {
                let _ = reply.send(self.cache.load_user_config());
            }
            MirrorCommand::SaveUserSettings { value, reply } => {
                let _ = reply.send(self.cache.save_user_settings(&value));
            }
            MirrorCommand::LoadUserSettings { reply } => {
                let _ = reply.send(self.cache.load_user_settings());
            }
            MirrorCommand::SaveFileUrls { urls, reply } => {
                let _ = reply.send(self.cache.save_file_urls(&urls));
            }
            MirrorCommand::LoadFileUrls { reply } => {
                let _ = reply.send(self.cache.load_file_urls());
            }
            MirrorCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }
        false
    }
}
