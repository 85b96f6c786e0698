//! Storage Module
//!
//! The minimal ordered key-value contract the cache is written against, plus
//! the backends shipped with the crate.

mod file;
mod memory;
mod order;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use order::OrderedEntries;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StorageResult;

/// Prefix reserved for the keys written by the default availability probe.
pub const PROBE_KEY_PREFIX: &str = "__storage_cache_probe__:";

static PROBE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A probe key that no other probe in this process is using.
fn probe_key() -> String {
    let n = PROBE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}{}:{}", PROBE_KEY_PREFIX, std::process::id(), n)
}

// == Availability ==
/// Outcome of a live backend probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

// == Storage Backend ==
/// An ordered string key-value store.
///
/// Implementations synchronize internally; every method is one atomic step
/// with respect to other callers.
pub trait StorageBackend: Send + Sync {
    /// Human readable backend name, used in logs and stats.
    fn name(&self) -> &str;

    /// Returns the stored string, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Returns the key at `index` in backend order.
    fn key(&self, index: usize) -> StorageResult<Option<String>>;

    /// Number of stored keys.
    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All keys in backend order.
    ///
    /// The default walks [`StorageBackend::key`]. Backends that can take one
    /// consistent snapshot should override it.
    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        for index in 0..self.len()? {
            if let Some(key) = self.key(index)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// Removes every key in `keys`. Absent keys are skipped.
    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }

    /// Checks whether the backend currently works.
    ///
    /// The default probe writes a fresh key under [`PROBE_KEY_PREFIX`], reads
    /// it back and deletes it. Any error along the way, or a mismatched read,
    /// means unavailable.
    fn probe(&self) -> Availability {
        let key = probe_key();
        let check = || -> StorageResult<bool> {
            self.set_item(&key, &key)?;
            let read_back = self.get_item(&key)?;
            self.remove_item(&key)?;
            Ok(read_back.as_deref() == Some(key.as_str()))
        };

        match check() {
            Ok(true) => Availability::Available,
            Ok(false) => Availability::Unavailable("probe value did not round-trip".to_string()),
            Err(e) => Availability::Unavailable(e.to_string()),
        }
    }
}
