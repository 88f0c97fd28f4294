//! Error types for the bucketlib library.

use thiserror::Error;

/// Main error type for bucketlib operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Remote listing failed (network, permission, or store error).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Persistent store rejected a write.
    #[error("Storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    /// A stored record could not be parsed.
    #[error("Corrupt record at {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    /// Walk went deeper than the configured bound.
    #[error("Maximum depth {depth} exceeded at {path}")]
    DepthExceeded { path: String, depth: usize },

    /// A refresh aborted part way; `listed` paths were already committed.
    #[error("Sync failed at '{path}' after {listed} listed paths: {source}")]
    SyncFailed {
        path: String,
        listed: usize,
        #[source]
        source: Box<CacheError>,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error from a file-backed store.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Invalid state format.
    #[error("Invalid state format: {0}")]
    InvalidState(String),

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

impl CacheError {
    /// Check if this error is a rejected persistence write.
    pub fn is_quota(&self) -> bool {
        matches!(self, CacheError::QuotaExceeded { .. })
    }

    /// Check if this error came from the remote store, directly or
    /// wrapped in a failed sync.
    pub fn is_transport(&self) -> bool {
        match self {
            CacheError::Transport(_) => true,
            CacheError::SyncFailed { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

/// Result type alias for bucketlib operations.
pub type Result<T> = std::result::Result<T, CacheError>;
