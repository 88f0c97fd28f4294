//! # bucketlib
//!
//! Local mirror cache for S3-compatible buckets.
//!
//! ## Features
//!
//! - **Folder tree mirror**: A hierarchical view of the bucket, rebuilt from
//!   delimiter-based listings and persisted between runs.
//! - **Per-path snapshots**: The last listing of every folder is stored so a
//!   folder can be shown without a network round trip.
//! - **Flat file index**: Every known file in tree order, with search and
//!   size summaries.
//! - **Full refresh**: A sequential, depth-bounded walk of the whole bucket
//!   with progress callbacks and partial-failure reporting.
//! - **Storage guard**: Writes that exceed the store quota evict the signed
//!   URL cache first and wipe the namespace as a last resort.
//! - **User records**: Opaque config and settings records, the signed URL
//!   cache, and the bucket credentials record.
//!
//! Reads never touch the network. Call `refresh_all()` when
//! `is_stale()` reports the mirror is older than its TTL.
//!
//! ## Example: Basic Usage
//!
//! ```no_run
//! use bucketlib::{FileStore, MirrorCache, MirrorHandle, RemoteLister};
//!
//! # async fn example<L: RemoteLister + Send + Sync + 'static>(lister: L) -> bucketlib::Result<()> {
//! let store = FileStore::open(".bucket-cache")?;
//! let handle = MirrorHandle::spawn(MirrorCache::new(store), lister);
//!
//! if handle.is_stale().await? {
//!     let report = handle.refresh_all().await?;
//!     println!("listed {} folders", report.listed_paths);
//! }
//!
//! for entry in handle.get_files_in_path("photos/").await? {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod base64;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod handle;
pub mod progress;
pub mod remote;
pub mod storage;

// Re-export commonly used types
pub use cache::{CacheStats, format_bytes};
pub use config::{EngineConfig, StoreConfig};
pub use engine::{MirrorCache, SyncReport, SyncStatus};
pub use error::{CacheError, Result};
pub use fs::{FileEntry, IndexSummary, ObjectSummary, TreeMirror, TreeNode};
pub use handle::MirrorHandle;
pub use progress::{ProgressCallback, SyncProgress};
pub use remote::{ObjectStore, RawListing, RemoteLister, StoreLister};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
