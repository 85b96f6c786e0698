//! Cache Statistics Module
//!
//! Counts lookups and writes so the hit rate of the cache can be observed.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a fresh entry
    pub hits: u64,
    /// Lookups that found nothing, a stale entry, or no backend
    pub misses: u64,
    /// Entries written successfully
    pub writes: u64,
    /// Writes dropped for lack of a backend or a backend failure
    pub failed_writes: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a write attempt and whether it landed.
    pub fn record_write(&mut self, stored: bool) {
        if stored {
            self.writes += 1;
        } else {
            self.failed_writes += 1;
        }
    }
}
