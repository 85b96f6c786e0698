//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::warn;

use crate::cache::{BackendKind, Cache, StorageRegistry};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetQuery, GetResponse, HealthResponse, KeysResponse,
    SetRequest, SetResponse, StatsResponse,
};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

/// File name of the persistent local storage inside the data directory
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: Cache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Local storage is file-backed under the data directory. When that file
    /// cannot be opened it falls back to memory so the server still starts.
    pub fn from_config(config: &Config) -> Self {
        let cache = Cache::new(config.cache.clone(), build_registry(config));
        Self::new(cache)
    }
}

fn build_registry(config: &Config) -> StorageRegistry {
    let session: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::with_quota(
        "session",
        config.storage_quota_bytes,
    ));

    let local: Arc<dyn StorageBackend> = match &config.data_dir {
        Some(dir) => match FileStorage::open("local", dir.join(LOCAL_STORAGE_FILE)) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Local storage unusable, keeping it in memory");
                Arc::new(MemoryStorage::with_quota("local", config.storage_quota_bytes))
            }
        },
        None => Arc::new(MemoryStorage::with_quota("local", config.storage_quota_bytes)),
    };

    StorageRegistry::new()
        .with(BackendKind::Local, local)
        .with(BackendKind::Session, session)
}

/// Handler for PUT /items
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    if !state.cache.set_item(&req.key, req.value, req.timestamp).await {
        return Err(CacheError::Unavailable(format!("'{}' was not cached", req.key)));
    }

    Ok(Json(SetResponse::stored(req.key)))
}

/// Handler for GET /items/:key
///
/// Misses, stale entries included, answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    let lookup = state.cache.get_item(&key, query.max_age).await;
    if !lookup.cache_hit {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(GetResponse::hit(key, lookup.value)))
}

/// Handler for DELETE /items/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete_item(&key).await {
        return Err(CacheError::Unavailable(format!("'{}' could not be deleted", key)));
    }

    Ok(Json(DeleteResponse::deleted(key)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse::new(state.cache.get_keys().await))
}

/// Handler for DELETE /items
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    if !state.cache.clear_cache().await {
        return Err(CacheError::Unavailable("cache could not be cleared".to_string()));
    }

    Ok(Json(ClearResponse { cleared: true }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let backend = state
        .cache
        .storage()
        .await
        .map(|backend| backend.name().to_string());

    Json(StatsResponse::new(&stats, backend))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
