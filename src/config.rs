//! Configuration Module
//!
//! Server settings loaded from environment variables, and the cache's own
//! [`CacheConfig`] which the host passes in explicitly.

use std::env;
use std::path::PathBuf;

use crate::cache::BackendKind;

/// Default byte quota for memory-backed storage areas (5 MiB).
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

// == Cache Config ==
/// Settings read by the backend selector on every resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When set, no backend is ever resolved
    pub disabled: bool,
    /// Backends to try, most preferred first
    pub storage_order: Vec<BackendKind>,
}

impl CacheConfig {
    /// Preference order used when the host does not configure one.
    pub fn default_storage_order() -> Vec<BackendKind> {
        vec![BackendKind::Local, BackendKind::Session]
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            storage_order: Self::default_storage_order(),
        }
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Selector settings handed to the cache
    pub cache: CacheConfig,
    /// Byte quota of the in-memory session storage
    pub storage_quota_bytes: usize,
    /// Directory of the file-backed local storage; memory is used when unset
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DISABLED` - `1`/`true` disables caching (default: false)
    /// - `STORAGE_ORDER` - comma separated backends (default: `localStorage,sessionStorage`)
    /// - `STORAGE_QUOTA_BYTES` - session storage quota (default: 5 MiB)
    /// - `CACHE_DATA_DIR` - local storage directory (default: platform cache dir)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cache: CacheConfig {
                disabled: env::var("CACHE_DISABLED")
                    .ok()
                    .map(|v| parse_flag(&v))
                    .unwrap_or(false),
                storage_order: env::var("STORAGE_ORDER")
                    .ok()
                    .map(|v| parse_storage_order(&v))
                    .unwrap_or_else(CacheConfig::default_storage_order),
            },
            storage_quota_bytes: env::var("STORAGE_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.storage_quota_bytes),
            data_dir: env::var("CACHE_DATA_DIR")
                .ok()
                .map(PathBuf::from)
                .or(defaults.data_dir),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache: CacheConfig::default(),
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
            data_dir: dirs::cache_dir().map(|dir| dir.join("storage_cache")),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Parses a comma separated backend list. Unknown names are skipped, so an
/// all-unknown list leaves the cache without a backend.
fn parse_storage_order(value: &str) -> Vec<BackendKind> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse::<BackendKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::warn!("Ignoring storage backend: {}", e);
                None
            }
        })
        .collect()
}
