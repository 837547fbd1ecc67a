//! Keyed cache with per-entry expiry
//!
//! Every lookup against an external provider goes through a [`CacheStore`].
//! The store is best-effort: read or write failures are logged and surface
//! as a miss, never as an error.

use crate::config::{CacheBackend, CacheConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A stored value and the moment it stops being served
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: &str, value: Value, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            key: key.to_string(),
            value,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value for `key`, or `None` when absent, expired or unreadable
    async fn get(&self, key: &str) -> Option<Value>;

    /// Replace the value for `key`
    async fn set(&self, key: &str, value: Value, ttl: Duration);

    async fn delete(&self, key: &str);

    /// True iff a non-expired entry exists
    async fn is_valid(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

/// Read a typed value; entries that no longer deserialize count as a miss
pub async fn get_typed<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let value = store.get(key).await?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(e) => {
            warn!(key = key, error = %e, "Discarding cache entry with unexpected shape");
            None
        }
    }
}

/// Store a typed value
pub async fn set_typed<T: Serialize>(store: &dyn CacheStore, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_value(value) {
        Ok(json) => store.set(key, json, ttl).await,
        Err(e) => warn!(key = key, error = %e, "Failed to serialize cache value"),
    }
}

/// Deterministic key for `purpose` over the given semantic inputs
///
/// Identical logical requests produce identical keys.
pub fn cache_key(purpose: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    format!("{}_{:x}", purpose, hasher.finalize())
}

/// Build the store selected by configuration
pub fn build_cache(config: &CacheConfig) -> Arc<dyn CacheStore> {
    match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::File => match &config.directory {
            Some(dir) => Arc::new(FileCache::with_cache_dir(dir)),
            None => Arc::new(FileCache::new()),
        },
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned map still holds valid entries
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of entries held, expired ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key = key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.lock()
            .insert(key.to_string(), CacheEntry::new(key, value, ttl));
    }

    async fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// JSON files under a cache directory, one file per key
#[derive(Debug, Clone)]
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    /// Store under the user cache directory
    pub fn new() -> Self {
        Self {
            cache_dir: Self::default_directory(),
        }
    }

    pub fn with_cache_dir<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    pub fn default_directory() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("copysmith")
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.cache_dir.join(format!("{:x}.json", digest))
    }

    async fn read_entry(&self, path: &Path) -> Option<CacheEntry> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read cache file");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = ?path, error = %e, "Corrupt cache file");
                let _ = fs::remove_file(path).await;
                None
            }
        }
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let entry = self.read_entry(&path).await?;

        // Guards against digest collisions as well as stale files
        if entry.key != key {
            return None;
        }
        if entry.is_expired() {
            debug!(key = key, "Cache entry expired");
            let _ = fs::remove_file(&path).await;
            return None;
        }
        Some(entry.value)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let path = self.entry_path(key);
        let entry = CacheEntry::new(key, value, ttl);

        if let Err(e) = fs::create_dir_all(&self.cache_dir).await {
            warn!(dir = ?self.cache_dir, error = %e, "Failed to create cache directory");
            return;
        }
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = fs::write(&path, json).await {
            warn!(path = ?path, error = %e, "Failed to write cache file");
        }
    }

    async fn delete(&self, key: &str) {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?path, error = %e, "Failed to delete cache file"),
        }
    }
}
