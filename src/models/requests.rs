//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::present_value;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /items
///
/// # Fields
/// - `key`: logical cache key
/// - `value`: any JSON value; leaving it out caches the absence of a value
/// - `timestamp`: write time in Unix seconds (defaults to now)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    #[serde(default, deserialize_with = "present_value")]
    pub value: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Query string of GET /items/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    /// Entries at least this many seconds old are treated as missing
    #[serde(default)]
    pub max_age: Option<u64>,
}
