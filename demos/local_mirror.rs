//! Example: Mirror a local directory as if it were a bucket
//!
//! Walks DIR with delimiter-style listings, stores the mirror under
//! CACHE_DIR and prints the resulting tree and cache stats.
//!
//! Usage:
//!   cargo run --example local_mirror -- <DIR> [CACHE_DIR]

use std::env;
use std::path::PathBuf;

use bucketlib::progress::make_progress_printer;
use bucketlib::{
    CacheError, FileStore, MirrorCache, MirrorHandle, ObjectStore, ObjectSummary, RawListing,
    StoreLister, TreeNode,
};
use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

/// Serves a local directory through the object-store listing interface.
struct LocalBucket {
    root: PathBuf,
}

impl ObjectStore for LocalBucket {
    async fn list_objects(&self, prefix: &str, delimiter: &str) -> bucketlib::Result<RawListing> {
        let dir = self.root.join(prefix.trim_end_matches(delimiter));
        let read = std::fs::read_dir(&dir)
            .map_err(|e| CacheError::Transport(format!("{}: {}", dir.display(), e)))?;

        let mut listing = RawListing::default();
        for entry in read {
            let entry = entry.map_err(|e| CacheError::Transport(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = entry
                .metadata()
                .map_err(|e| CacheError::Transport(e.to_string()))?;

            if meta.is_dir() {
                listing
                    .common_prefixes
                    .push(format!("{}{}{}", prefix, name, delimiter));
            } else {
                listing.contents.push(ObjectSummary {
                    key: format!("{}{}", prefix, name),
                    size: meta.len(),
                    last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }
        listing.common_prefixes.sort();
        listing.contents.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(listing)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bucketlib=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: local_mirror <DIR> [CACHE_DIR]");
        std::process::exit(1);
    }

    let root = PathBuf::from(&args[1]);
    let cache_dir = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| ".bucket-cache".to_string());

    let cache = MirrorCache::new(FileStore::open(&cache_dir)?);
    let handle = MirrorHandle::spawn(cache, StoreLister::new(LocalBucket { root }));

    if handle.is_stale().await? {
        println!("Mirror is stale, refreshing...");
        let report = handle
            .refresh_all_with_progress(make_progress_printer())
            .await?;
        if !report.is_complete() {
            println!("⚠️  Skipped {} folders below the depth limit", report.pruned.len());
        }
    } else {
        println!("Using cached mirror from {}", cache_dir);
    }

    println!();
    print_tree(&handle.get_tree().await?, 0);

    let summary = handle.index_summary().await?;
    let stats = handle.stats().await?;
    println!();
    println!(
        "📁 {} files, {}",
        summary.file_count,
        bucketlib::format_bytes(summary.total_bytes)
    );
    println!(
        "💾 Cache: {} ({} snapshots, tree {})",
        stats.total_size_display(),
        stats.file_count,
        stats.tree_size_display()
    );

    handle.shutdown().await;
    Ok(())
}

fn print_tree(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{}/", indent, node.name);
    for file in &node.files {
        println!("{}  {} ({} B)", indent, file.name, file.size);
    }
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}
