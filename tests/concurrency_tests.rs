//! Concurrency Tests
//!
//! Drives one shared cache from many tokio tasks over the default
//! `[localStorage, sessionStorage]` order with a file-backed local store.

use std::sync::Arc;

use serde_json::json;
use storage_cache::{
    cache::{BackendKind, Cache, StorageRegistry},
    storage::{FileStorage, MemoryStorage, StorageBackend},
    CacheConfig, CacheLookup,
};

// == Helper Functions ==

fn file_backed_cache(dir: &tempfile::TempDir) -> (Arc<FileStorage>, Arc<MemoryStorage>, Arc<Cache>) {
    let local = Arc::new(FileStorage::open("local", dir.path().join("local_storage.json")).unwrap());
    let session = Arc::new(MemoryStorage::new("session"));
    let registry = StorageRegistry::new()
        .with(BackendKind::Local, local.clone())
        .with(BackendKind::Session, session.clone());
    let cache = Arc::new(Cache::new(CacheConfig::default(), registry));
    (local, session, cache)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_set_then_get_always_hits() {
    let dir = tempfile::tempdir().unwrap();
    let (local, session, cache) = file_backed_cache(&dir);

    let tasks: Vec<_> = (0..8)
        .map(|task| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let mut failures = 0;
                for i in 0..50 {
                    let key = format!("task{}-{}", task, i);
                    let value = json!({"task": task, "i": i});
                    if !cache.set_item(&key, Some(value.clone()), None).await {
                        failures += 1;
                    } else if cache.get_item(&key, None).await != CacheLookup::hit(Some(value)) {
                        failures += 1;
                    }
                }
                failures
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), 0);
    }

    // Nothing spilled over into the fallback backend
    assert!(session.is_empty().unwrap());
    assert_eq!(local.len().unwrap(), 8 * 50);

    let reopened = FileStorage::open("local", local.path()).unwrap();
    assert_eq!(reopened.len().unwrap(), 8 * 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_deletes_and_clear_stay_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (local, _, cache) = file_backed_cache(&dir);

    for i in 0..40 {
        assert!(cache.set_item(&format!("k{}", i), Some(json!(i)), None).await);
    }

    let tasks: Vec<_> = (0..4)
        .map(|task| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                for i in (task..40).step_by(4) {
                    assert!(cache.delete_item(&format!("k{}", i)).await);
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert!(cache.get_keys().await.is_empty());
    assert!(cache.set_item("after", Some(json!(true)), None).await);
    assert!(cache.clear_cache().await);

    let reopened = FileStorage::open("local", local.path()).unwrap();
    assert!(reopened.is_empty().unwrap());
}
