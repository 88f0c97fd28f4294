//! Engine settings and stored object-store credentials.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::base64::{decode_blob, encode_blob};
use crate::cache::DEFAULT_NAMESPACE;
use crate::cache::snapshot::DEFAULT_TTL;
use crate::error::{CacheError, Result};
use crate::storage::KeyValueStore;

/// Default bound on refresh recursion.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Storage key of the encoded [`StoreConfig`]. Lives outside the engine
/// namespace so clearing the cache keeps the credentials.
pub const STORE_CONFIG_KEY: &str = "s3ConfigData";

/// Tunables of a cache engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prefix of every persisted key
    pub namespace: String,
    /// Age after which the cache is reported stale
    pub ttl: Duration,
    /// Deepest folder level a refresh will list
    pub max_depth: usize,
}

impl EngineConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl: DEFAULT_TTL,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_region() -> String {
    "auto".to_string()
}

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StoreConfig {
    /// Check if the settings are enough to build a client.
    pub fn is_complete(&self) -> bool {
        !self.endpoint.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
    }

    /// Encode as base64 over JSON.
    ///
    /// This is reversible encoding, not encryption: anyone with access to
    /// the store can recover the secret key.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(encode_blob(json.as_bytes()))
    }

    /// Decode a value produced by [`StoreConfig::encode`].
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = decode_blob(encoded)?;
        let json = String::from_utf8(bytes)
            .map_err(|e| CacheError::InvalidState(format!("Config is not UTF-8: {}", e)))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Persist under [`STORE_CONFIG_KEY`].
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.set(STORE_CONFIG_KEY, &self.encode()?)
    }

    /// Load from [`STORE_CONFIG_KEY`]; undecodable data is treated as absent.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Option<Self> {
        let encoded = store.get(STORE_CONFIG_KEY)?;
        match Self::decode(&encoded) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "stored store config could not be decoded");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn sample() -> StoreConfig {
        StoreConfig {
            endpoint: "https://acct.r2.cloudflarestorage.com".to_string(),
            region: "auto".to_string(),
            bucket: "images".to_string(),
            access_key_id: "AKID".to_string(),
            secret_access_key: "SECRET".to_string(),
        }
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.namespace, "r2_image_hosting_");
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.max_depth, 10);

        let tuned = config.with_max_depth(3).with_namespace("t_");
        assert_eq!(tuned.max_depth, 3);
        assert_eq!(tuned.namespace, "t_");
    }

    #[test]
    fn test_store_config_save_load() {
        let mut store = MemoryStore::new();
        sample().save(&mut store).unwrap();

        let raw = store.get(STORE_CONFIG_KEY).unwrap();
        assert!(!raw.contains("SECRET"));
        assert_eq!(StoreConfig::load(&store), Some(sample()));
    }

    #[test]
    fn test_store_config_region_default_and_garbage() {
        let parsed: StoreConfig = serde_json::from_str(
            r#"{"endpoint":"e","bucket":"b","accessKeyId":"a","secretAccessKey":"s"}"#,
        )
        .unwrap();
        assert_eq!(parsed.region, "auto");
        assert!(parsed.is_complete());

        let mut store = MemoryStore::new();
        store.set(STORE_CONFIG_KEY, "%%%").unwrap();
        assert_eq!(StoreConfig::load(&store), None);
    }
}
