//! Integration tests for cache module
//!
//! Tests single-flight loading, bounded loader parallelism, and owner
//! notification under concurrent access

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use capture_common::cache::{CacheError, ResourceCache, ResourceCacheConfig, ResourceOwner};
use tokio::sync::Notify;

#[derive(Default)]
struct PageOwner {
    unloads: AtomicUsize,
}

impl ResourceOwner for PageOwner {
    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

fn new_cache(max_size_kb: usize, loaders: usize) -> ResourceCache<String> {
    let config = ResourceCacheConfig::builder()
        .max_size_kb(max_size_kb)
        .max_concurrent_loaders(loaders)
        .build()
        .expect("valid config");
    ResourceCache::new(config).expect("cache")
}

/// Verifies that concurrent lookups of one key share a single loader.
///
/// # Test Steps
/// 1. Start eight lookups for the same key while the loader is blocked
/// 2. Release the loader
/// 3. Verify every caller got the same buffer and the loader ran once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_gets_share_one_loader() {
    let cache = new_cache(1024, 3);
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        let gate = Arc::clone(&gate);
        handles.push(tokio::spawn(async move {
            cache
                .get("doc-1/page-1".to_string(), Arc::new(PageOwner::default()), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok::<_, std::io::Error>(vec![7u8; 2048])
                })
                .await
        }));
    }

    // Let every task reach the flight before releasing it
    tokio::time::sleep(Duration::from_millis(100)).await;
    gate.notify_one();

    let mut payloads = Vec::new();
    for handle in handles {
        payloads.push(handle.await.expect("task").expect("payload"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(payloads.iter().all(|p| Arc::ptr_eq(p, &payloads[0])));

    let stats = cache.stats();
    assert_eq!(stats.loads, 1);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.size_kb, 2);
    assert_eq!(stats.joins + 1, stats.misses);
}

/// Verifies that a shared loader failure reaches every joined caller.
///
/// # Test Steps
/// 1. Start several lookups for one key with a failing loader
/// 2. Verify every caller observes `LoadFailed`
/// 3. Verify nothing was cached
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_failure_reaches_all_callers() {
    let cache = new_cache(1024, 2);
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            cache
                .get("broken".to_string(), Arc::new(PageOwner::default()), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Err::<Vec<u8>, _>(std::io::Error::other("corrupt image"))
                })
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.expect("task");
        assert!(matches!(result, Err(CacheError::LoadFailed(_))));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(cache.is_empty());
}

/// Verifies that no more than the configured number of loaders run at once.
///
/// # Test Steps
/// 1. Configure a limit of two loaders
/// 2. Request ten distinct keys concurrently, each loader sleeping briefly
/// 3. Verify the observed peak never exceeds two and every key loaded
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_loader_parallelism_is_bounded() {
    let cache = new_cache(1024, 2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..10 {
        let cache = cache.clone();
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            cache
                .get(format!("page-{i}"), Arc::new(PageOwner::default()), move || async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, std::io::Error>(vec![0u8; 512])
                })
                .await
        }));
    }

    for handle in handles {
        handle.await.expect("task").expect("payload");
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    let stats = cache.stats();
    assert_eq!(stats.loads, 10);
    assert_eq!(stats.entries, 10);
    assert!(stats.peak_active_loaders <= 2);
    assert_eq!(stats.active_loaders, 0);
}

/// Verifies that every evicted owner is unloaded exactly once under churn.
///
/// # Test Steps
/// 1. Load twenty 1 KB payloads into a 5 KB cache
/// 2. Verify fifteen owners were unloaded once and five remain cached
#[tokio::test]
async fn test_eviction_unloads_each_owner_once() {
    let cache = new_cache(5, 1);
    let owners: Vec<Arc<PageOwner>> = (0..20).map(|_| Arc::new(PageOwner::default())).collect();

    for (i, owner) in owners.iter().enumerate() {
        let owner: Arc<dyn ResourceOwner> = owner.clone();
        cache
            .get(format!("page-{i}"), owner, || async { Ok::<_, std::io::Error>(vec![1u8; 1024]) })
            .await
            .expect("payload");
    }

    let unloaded: Vec<usize> = owners.iter().map(|o| o.unloads.load(Ordering::SeqCst)).collect();
    assert_eq!(unloaded[..15], [1; 15]);
    assert_eq!(unloaded[15..], [0; 5]);
    assert_eq!(cache.len(), 5);
    assert_eq!(cache.stats().evictions, 15);
}
