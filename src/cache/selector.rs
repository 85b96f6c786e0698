//! Backend Selector Module
//!
//! Decides, on every call, which storage backend the cache talks to.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::config::CacheConfig;
use crate::storage::{Availability, StorageBackend};

// == Backend Kind ==
/// Named storage mechanisms that can appear in a preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Persistent storage
    Local,
    /// Storage scoped to the running process
    Session,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "localStorage",
            BackendKind::Session => "sessionStorage",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "localstorage" | "local" => Ok(BackendKind::Local),
            "sessionstorage" | "session" => Ok(BackendKind::Session),
            _ => Err(format!("unknown storage backend '{}'", s)),
        }
    }
}

// == Backend Override ==
/// Test hook that short-circuits the preference list.
#[derive(Clone, Default)]
pub enum BackendOverride {
    /// Use the preference list
    #[default]
    Auto,
    /// Resolve to no backend
    Disabled,
    /// Always use this backend, without probing it
    Forced(Arc<dyn StorageBackend>),
}

impl fmt::Debug for BackendOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendOverride::Auto => f.write_str("Auto"),
            BackendOverride::Disabled => f.write_str("Disabled"),
            BackendOverride::Forced(backend) => write!(f, "Forced({})", backend.name()),
        }
    }
}

// == Storage Registry ==
/// The concrete backend behind each [`BackendKind`].
#[derive(Clone, Default)]
pub struct StorageRegistry {
    backends: HashMap<BackendKind, Arc<dyn StorageBackend>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StorageRegistry::register`].
    pub fn with(mut self, kind: BackendKind, backend: Arc<dyn StorageBackend>) -> Self {
        self.register(kind, backend);
        self
    }

    pub fn register(&mut self, kind: BackendKind, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(kind, backend);
    }

    pub fn get(&self, kind: BackendKind) -> Option<Arc<dyn StorageBackend>> {
        self.backends.get(&kind).cloned()
    }
}

// == Select Backend ==
/// Resolution rules, in order: the disabled flag wins, then an override,
/// then the first registered backend in the preference list whose probe
/// reports it available.
pub fn select_backend(
    config: &CacheConfig,
    backend_override: &BackendOverride,
    registry: &StorageRegistry,
) -> Option<Arc<dyn StorageBackend>> {
    if config.disabled {
        debug!("Caching disabled, no storage backend");
        return None;
    }

    match backend_override {
        BackendOverride::Disabled => return None,
        BackendOverride::Forced(backend) => return Some(Arc::clone(backend)),
        BackendOverride::Auto => {}
    }

    for kind in &config.storage_order {
        let Some(backend) = registry.get(*kind) else {
            debug!(backend = %kind, "Storage backend not registered");
            continue;
        };

        match backend.probe() {
            Availability::Available => return Some(backend),
            Availability::Unavailable(reason) => {
                debug!(backend = %kind, %reason, "Storage backend unavailable");
            }
        }
    }

    None
}

#[derive(Debug, Clone, Default)]
struct SelectorState {
    config: CacheConfig,
    backend_override: BackendOverride,
}

// == Backend Selector ==
/// Holds the host-owned selection settings and resolves a backend on demand.
pub struct BackendSelector {
    registry: StorageRegistry,
    state: RwLock<SelectorState>,
}

impl BackendSelector {
    pub fn new(config: CacheConfig, registry: StorageRegistry) -> Self {
        Self {
            registry,
            state: RwLock::new(SelectorState {
                config,
                backend_override: BackendOverride::Auto,
            }),
        }
    }

    /// Resolves the backend to use right now. Probes on every call.
    pub async fn resolve(&self) -> Option<Arc<dyn StorageBackend>> {
        // Probing happens outside the lock
        let state = self.state.read().await.clone();
        select_backend(&state.config, &state.backend_override, &self.registry)
    }

    pub async fn config(&self) -> CacheConfig {
        self.state.read().await.config.clone()
    }

    pub async fn set_storage_order(&self, order: Vec<BackendKind>) {
        self.state.write().await.config.storage_order = order;
    }

    pub async fn reset_default_storage_order(&self) {
        self.set_storage_order(CacheConfig::default_storage_order()).await;
    }

    pub async fn set_disabled(&self, disabled: bool) {
        self.state.write().await.config.disabled = disabled;
    }

    pub async fn set_backend_override(&self, backend_override: BackendOverride) {
        debug!(?backend_override, "Storage backend override changed");
        self.state.write().await.backend_override = backend_override;
    }
}
