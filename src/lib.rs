//! Storage Cache - a namespaced TTL key-value cache
//!
//! Stores timestamped JSON values in whichever storage backend is available,
//! treats entries past a caller-supplied age as missing, and never fails the
//! caller: without a working backend every operation degrades to "not cached".

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use api::AppState;
pub use cache::{Cache, CacheLookup};
pub use config::{CacheConfig, Config};
