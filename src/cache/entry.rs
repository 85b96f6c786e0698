//! Cache Entry Module
//!
//! The persisted form of a cached value: `{"timestamp":<secs>,"value":<any>}`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A value together with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time, Unix seconds
    pub timestamp: i64,
    /// The cached value. `None` caches the absence of a value and is written
    /// by leaving the field out, which keeps it distinct from JSON `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub value: Option<Value>,
}

/// Maps any present `value` field, `null` included, to `Some`.
pub(crate) fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(value: Option<Value>, timestamp: i64) -> Self {
        Self { timestamp, value }
    }

    // == Encode ==
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    // == Decode ==
    /// Parses a stored string. Anything that is not a well-formed entry
    /// yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Seconds elapsed between the write and `now`.
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    // == Is Stale ==
    /// An entry is stale once its age reaches `max_age` seconds.
    pub fn is_stale(&self, max_age: u64, now: i64) -> bool {
        let max_age = i64::try_from(max_age).unwrap_or(i64::MAX);
        self.age(now) >= max_age
    }
}

// == Cache Lookup ==
/// Result of a cache read.
///
/// A miss always carries `value: None`. A hit may also carry `None` when the
/// absence of a value was cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheLookup<T = Value> {
    pub cache_hit: bool,
    pub value: Option<T>,
}

impl<T> CacheLookup<T> {
    pub fn hit(value: Option<T>) -> Self {
        Self {
            cache_hit: true,
            value,
        }
    }

    pub fn miss() -> Self {
        Self {
            cache_hit: false,
            value: None,
        }
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
