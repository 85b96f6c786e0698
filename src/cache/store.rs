//! Cache Store Module
//!
//! The best-effort cache: namespaced, timestamped entries in whichever backend
//! the selector resolves. No operation here ever fails towards the caller;
//! backend trouble degrades to "not cached".

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{
    current_timestamp, BackendKind, BackendOverride, BackendSelector, CacheEntry, CacheLookup,
    CacheStats, StorageRegistry, STORAGE_KEY_PREFIX,
};
use crate::config::CacheConfig;
use crate::error::StorageResult;
use crate::storage::StorageBackend;

fn namespaced(key: &str) -> String {
    format!("{}{}", STORAGE_KEY_PREFIX, key)
}

/// All keys in `backend` that carry the namespace prefix, in backend order.
fn namespaced_keys(backend: &dyn StorageBackend) -> StorageResult<Vec<String>> {
    Ok(backend
        .keys()?
        .into_iter()
        .filter(|key| key.starts_with(STORAGE_KEY_PREFIX))
        .collect())
}

// == Cache ==
/// TTL key-value cache over a pluggable storage backend.
pub struct Cache {
    selector: BackendSelector,
    stats: RwLock<CacheStats>,
}

impl Cache {
    // == Constructor ==
    pub fn new(config: CacheConfig, registry: StorageRegistry) -> Self {
        Self {
            selector: BackendSelector::new(config, registry),
            stats: RwLock::new(CacheStats::new()),
        }
    }

    // == Backend Selection ==
    /// The backend the next operation would use, or `None`.
    pub async fn storage(&self) -> Option<Arc<dyn StorageBackend>> {
        self.selector.resolve().await
    }

    pub async fn config(&self) -> CacheConfig {
        self.selector.config().await
    }

    pub async fn set_storage_order(&self, order: Vec<BackendKind>) {
        self.selector.set_storage_order(order).await;
    }

    pub async fn reset_default_storage_order(&self) {
        self.selector.reset_default_storage_order().await;
    }

    pub async fn set_disabled(&self, disabled: bool) {
        self.selector.set_disabled(disabled).await;
    }

    pub async fn set_backend_override(&self, backend_override: BackendOverride) {
        self.selector.set_backend_override(backend_override).await;
    }

    // == Set ==
    /// Caches `value` under `key`, stamped with `timestamp` or the current
    /// time. `None` caches the absence of a value.
    ///
    /// Returns `false` without writing when no backend is available, when the
    /// key is empty, or when the backend rejects the write.
    pub async fn set_item(&self, key: &str, value: Option<Value>, timestamp: Option<i64>) -> bool {
        let stored = self.write_entry(key, value, timestamp).await;
        self.stats.write().await.record_write(stored);
        stored
    }

    /// Serializes `value` and caches it like [`Cache::set_item`].
    pub async fn set_typed<T: Serialize>(&self, key: &str, value: &T, timestamp: Option<i64>) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.set_item(key, Some(value), timestamp).await,
            Err(e) => {
                warn!(key, error = %e, "Value is not serializable, not caching");
                self.stats.write().await.record_write(false);
                false
            }
        }
    }

    async fn write_entry(&self, key: &str, value: Option<Value>, timestamp: Option<i64>) -> bool {
        if key.is_empty() {
            debug!("Refusing to cache under an empty key");
            return false;
        }

        let Some(backend) = self.storage().await else {
            return false;
        };

        let entry = CacheEntry::new(value, timestamp.unwrap_or_else(current_timestamp));
        let encoded = match entry.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return false;
            }
        };

        match backend.set_item(&namespaced(key), &encoded) {
            Ok(()) => {
                debug!(key, backend = backend.name(), "Cached value");
                true
            }
            Err(e) => {
                warn!(key, backend = backend.name(), error = %e, "Cache write failed");
                false
            }
        }
    }

    // == Get ==
    /// Looks up `key`. With `max_age`, entries at least that many seconds
    /// old count as a miss; they are left in place.
    ///
    /// Every hit decodes the stored string afresh, so returned values never
    /// alias each other.
    pub async fn get_item(&self, key: &str, max_age: Option<u64>) -> CacheLookup {
        let lookup = self.read_entry(key, max_age).await;
        self.record_lookup(lookup.cache_hit).await;
        lookup
    }

    /// Looks up `key` and decodes the value into `T`. A value that does not
    /// fit `T` is a miss.
    pub async fn get_typed<T: DeserializeOwned>(&self, key: &str, max_age: Option<u64>) -> CacheLookup<T> {
        let raw = self.read_entry(key, max_age).await;
        let lookup = match (raw.cache_hit, raw.value) {
            (true, Some(value)) => match serde_json::from_value(value) {
                Ok(typed) => CacheLookup::hit(Some(typed)),
                Err(e) => {
                    debug!(key, error = %e, "Cached value does not match requested type");
                    CacheLookup::miss()
                }
            },
            (true, None) => CacheLookup::hit(None),
            (false, _) => CacheLookup::miss(),
        };
        self.record_lookup(lookup.cache_hit).await;
        lookup
    }

    async fn read_entry(&self, key: &str, max_age: Option<u64>) -> CacheLookup {
        let Some(backend) = self.storage().await else {
            return CacheLookup::miss();
        };

        let raw = match backend.get_item(&namespaced(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheLookup::miss(),
            Err(e) => {
                warn!(key, backend = backend.name(), error = %e, "Cache read failed");
                return CacheLookup::miss();
            }
        };

        let Some(entry) = CacheEntry::decode(&raw) else {
            debug!(key, "Ignoring malformed cache entry");
            return CacheLookup::miss();
        };

        if let Some(max_age) = max_age {
            let now = current_timestamp();
            if entry.is_stale(max_age, now) {
                debug!(key, age = entry.age(now), max_age, "Cache entry is stale");
                return CacheLookup::miss();
            }
        }

        CacheLookup::hit(entry.value)
    }

    async fn record_lookup(&self, hit: bool) {
        let mut stats = self.stats.write().await;
        if hit {
            stats.record_hit();
        } else {
            stats.record_miss();
        }
    }

    // == Delete ==
    /// Removes `key`. Returns `true` when a backend completed the removal,
    /// whether or not the key existed.
    pub async fn delete_item(&self, key: &str) -> bool {
        let Some(backend) = self.storage().await else {
            return false;
        };

        match backend.remove_item(&namespaced(key)) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, backend = backend.name(), error = %e, "Cache delete failed");
                false
            }
        }
    }

    // == Keys ==
    /// Logical keys of all cached entries, in backend order. Keys written to
    /// the backend by anyone else are left out.
    pub async fn get_keys(&self) -> Vec<String> {
        let Some(backend) = self.storage().await else {
            return Vec::new();
        };

        match namespaced_keys(backend.as_ref()) {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| key.strip_prefix(STORAGE_KEY_PREFIX))
                .map(str::to_string)
                .collect(),
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Listing cache keys failed");
                Vec::new()
            }
        }
    }

    // == Clear ==
    /// Removes every cached entry and nothing else. Returns `true` when a
    /// backend was available and all removals completed.
    pub async fn clear_cache(&self) -> bool {
        let Some(backend) = self.storage().await else {
            return false;
        };

        let result = namespaced_keys(backend.as_ref())
            .and_then(|keys| backend.remove_items(&keys).map(|()| keys.len()));

        match result {
            Ok(count) => {
                debug!(backend = backend.name(), removed = count, "Cleared cache");
                true
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Clearing cache failed");
                false
            }
        }
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
