//! In-memory storage backend
//!
//! Lives as long as the process, like a browser session storage area.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::{Availability, OrderedEntries, StorageBackend, PROBE_KEY_PREFIX};
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Default)]
struct MemoryInner {
    entries: OrderedEntries,
    /// Sum of key and value lengths of all entries
    used_bytes: usize,
}

// == Memory Storage ==
/// Insertion-ordered in-memory backend with an optional byte quota.
#[derive(Debug)]
pub struct MemoryStorage {
    name: String,
    quota: Option<usize>,
    available: AtomicBool,
    inner: RwLock<MemoryInner>,
}

impl MemoryStorage {
    /// Creates an unbounded store.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quota: None,
            available: AtomicBool::new(true),
            inner: RwLock::new(MemoryInner::default()),
        }
    }

    /// Creates a store that rejects writes pushing it past `quota` bytes.
    pub fn with_quota(name: impl Into<String>, quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new(name)
        }
    }

    /// Switches the store on or off. While off, every operation fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.inner.read().map(|inner| inner.used_bytes).unwrap_or(0)
    }

    /// All entries in backend order.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!(
                "{} storage is switched off",
                self.name
            )))
        }
    }

    /// Checks, under one lock and without writing, that a probe-sized entry
    /// would be accepted.
    fn check_writable(&self) -> StorageResult<()> {
        self.ensure_available()?;
        let inner = self.inner.read()?;

        let needed = inner.used_bytes + 2 * PROBE_KEY_PREFIX.len();
        match self.quota {
            Some(quota) if needed > quota => Err(StorageError::QuotaExceeded { needed, quota }),
            _ => Ok(()),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        let inner = self.inner.read()?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        let mut inner = self.inner.write()?;

        let previous = inner
            .entries
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let needed = inner.used_bytes - previous + key.len() + value.len();

        if let Some(quota) = self.quota {
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        inner.entries.set(key, value);
        inner.used_bytes = needed;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        let mut inner = self.inner.write()?;

        if let Some((_, old)) = inner.entries.remove(key) {
            inner.used_bytes -= key.len() + old.len();
        }
        Ok(())
    }

    fn key(&self, index: usize) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        let inner = self.inner.read()?;
        Ok(inner.entries.key_at(index).cloned())
    }

    fn len(&self) -> StorageResult<usize> {
        self.ensure_available()?;
        let inner = self.inner.read()?;
        Ok(inner.entries.len())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.ensure_available()?;
        let inner = self.inner.read()?;
        Ok(inner.entries.keys().cloned().collect())
    }

    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        self.ensure_available()?;
        let mut inner = self.inner.write()?;

        let doomed: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut freed = 0;
        inner.entries.retain(|key, value| {
            if doomed.contains(key) {
                freed += key.len() + value.len();
                false
            } else {
                true
            }
        });
        inner.used_bytes -= freed;
        Ok(())
    }

    fn probe(&self) -> Availability {
        match self.check_writable() {
            Ok(()) => Availability::Available,
            Err(e) => Availability::Unavailable(e.to_string()),
        }
    }
}
