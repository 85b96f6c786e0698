//! Cache Module
//!
//! Namespaced TTL caching on top of the storage backends.

mod entry;
mod key;
mod selector;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp, CacheEntry, CacheLookup};
pub(crate) use entry::present_value;
pub use key::cache_key;
pub use selector::{select_backend, BackendKind, BackendOverride, BackendSelector, StorageRegistry};
pub use stats::CacheStats;
pub use store::Cache;

// == Public Constants ==
/// Prepended to every logical key before it reaches a backend
pub const STORAGE_KEY_PREFIX: &str = "storagecache_";
