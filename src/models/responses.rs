//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for GET /items/:key
///
/// `value` is left out entirely when the absence of a value was cached, so
/// it stays distinguishable from a cached `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponse {
    pub key: String,
    pub cache_hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl GetResponse {
    pub fn hit(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            cache_hit: true,
            value,
        }
    }
}

/// Response body for PUT /items
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub key: String,
    pub stored: bool,
}

impl SetResponse {
    pub fn stored(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            stored: true,
        }
    }
}

/// Response body for DELETE /items/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn deleted(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            deleted: true,
        }
    }
}

/// Response body for GET /keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub count: usize,
    pub keys: Vec<String>,
}

impl KeysResponse {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            count: keys.len(),
            keys,
        }
    }
}

/// Response body for DELETE /items
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Successful writes
    pub writes: u64,
    /// Writes that did not land
    pub failed_writes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Name of the backend the cache resolves to right now
    pub backend: Option<String>,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, backend: Option<String>) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            writes: stats.writes,
            failed_writes: stats.failed_writes,
            hit_rate: stats.hit_rate(),
            backend,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
