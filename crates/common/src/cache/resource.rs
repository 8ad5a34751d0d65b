//! LRU payload cache with single-flight, slot-bounded loaders

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::config::ResourceCacheConfig;
use super::error::CacheError;
use super::stats::{CacheStats, MetricsCollector};

/// Immutable byte payload shared between the cache and its callers
pub type Payload = Arc<[u8]>;

/// Object that holds a reference to a cached payload
///
/// `unload` is invoked exactly once when the entry leaves the cache, either
/// through LRU eviction or explicit invalidation. It runs after the cache
/// locks are released, so implementations may call back into the cache.
pub trait ResourceOwner: Send + Sync {
    /// Release any reference the owner keeps to the payload
    fn unload(&self);
}

type LoadFuture = Shared<BoxFuture<'static, Result<Payload, CacheError>>>;
type WeakLoadFuture = WeakShared<BoxFuture<'static, Result<Payload, CacheError>>>;

struct Entry {
    payload: Payload,
    size_kb: usize,
    owner: Arc<dyn ResourceOwner>,
}

struct Flight {
    id: u64,
    future: WeakLoadFuture,
}

struct Store<K> {
    entries: LruCache<K, Entry>,
    size_kb: usize,
}

impl<K: Eq + Hash + Debug> Store<K> {
    /// Insert an entry and evict least recently used entries until the
    /// budget holds again. Returns the owners that must be unloaded.
    fn insert(
        &mut self,
        key: K,
        entry: Entry,
        max_size_kb: usize,
        metrics: &MetricsCollector,
    ) -> Vec<Arc<dyn ResourceOwner>> {
        let mut released = Vec::new();

        if entry.size_kb > max_size_kb {
            debug!(key = ?key, size_kb = entry.size_kb, max_size_kb, "payload exceeds cache budget, not cached");
            return released;
        }

        let size_kb = entry.size_kb;
        if let Some(previous) = self.entries.put(key, entry) {
            self.size_kb = self.size_kb.saturating_sub(previous.size_kb);
            released.push(previous.owner);
        }
        self.size_kb += size_kb;

        while self.size_kb > max_size_kb {
            let Some((evicted_key, evicted)) = self.entries.pop_lru() else {
                break;
            };
            self.size_kb = self.size_kb.saturating_sub(evicted.size_kb);
            metrics.record_eviction();
            debug!(key = ?evicted_key, size_kb = evicted.size_kb, "evicted cached payload");
            released.push(evicted.owner);
        }

        released
    }

    fn remove(&mut self, key: &K) -> Option<Entry> {
        let entry = self.entries.pop(key)?;
        self.size_kb = self.size_kb.saturating_sub(entry.size_kb);
        Some(entry)
    }
}

struct Inner<K> {
    config: ResourceCacheConfig,
    store: Mutex<Store<K>>,
    loaders: Mutex<HashMap<K, Flight>>,
    slots: Arc<Semaphore>,
    next_flight: AtomicU64,
    metrics: MetricsCollector,
}

impl<K: Eq + Hash + Clone + Debug> Inner<K> {
    fn lookup(&self, key: &K) -> Option<Payload> {
        let mut store = self.store.lock();
        let payload = store.entries.get(key).map(|entry| Arc::clone(&entry.payload));
        if payload.is_some() {
            self.metrics.record_hit();
        }
        payload
    }

    /// Publish a finished load and retire its flight under the loader lock,
    /// so a concurrent `get` sees either the flight or the entry.
    fn finish(
        &self,
        key: &K,
        flight_id: u64,
        loaded: Option<(Payload, Arc<dyn ResourceOwner>)>,
    ) -> Vec<Arc<dyn ResourceOwner>> {
        let mut loaders = self.loaders.lock();

        let released = match loaded {
            Some((payload, owner)) => {
                let entry = Entry { size_kb: size_in_kb(payload.len()), payload, owner };
                self.store.lock().insert(
                    key.clone(),
                    entry,
                    self.config.max_size_kb,
                    &self.metrics,
                )
            }
            None => Vec::new(),
        };

        retire_flight(&mut loaders, key, flight_id);
        released
    }

    /// Drop the flight marker of a load that was abandoned before finishing
    fn abandon(&self, key: &K, flight_id: u64) {
        let mut loaders = self.loaders.lock();
        retire_flight(&mut loaders, key, flight_id);
    }
}

fn retire_flight<K: Eq + Hash>(loaders: &mut HashMap<K, Flight>, key: &K, flight_id: u64) {
    if loaders.get(key).is_some_and(|flight| flight.id == flight_id) {
        loaders.remove(key);
    }
}

fn size_in_kb(len: usize) -> usize {
    len.div_ceil(1024).max(1)
}

fn unload_all(owners: Vec<Arc<dyn ResourceOwner>>) {
    for owner in owners {
        owner.unload();
    }
}

/// Clears the flight marker if the load future is dropped before it finishes
struct FlightGuard<K: Eq + Hash + Clone + Debug> {
    inner: Weak<Inner<K>>,
    key: K,
    flight_id: u64,
    armed: bool,
}

impl<K: Eq + Hash + Clone + Debug> Drop for FlightGuard<K> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            debug!(key = ?self.key, "payload load abandoned");
            inner.abandon(&self.key, self.flight_id);
        }
    }
}

/// Bounded in-memory cache for document payloads
///
/// Cloning the cache is cheap and every clone shares the same storage.
pub struct ResourceCache<K> {
    inner: Arc<Inner<K>>,
}

impl<K> Clone for ResourceCache<K> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<K> Debug for ResourceCache<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache").field("config", &self.inner.config).finish_non_exhaustive()
    }
}

impl<K> ResourceCache<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Create a cache with the given budget and loader limit
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfiguration`] if the configuration is
    /// invalid.
    pub fn new(config: ResourceCacheConfig) -> Result<Self, CacheError> {
        config.validate()?;

        let slots = Arc::new(Semaphore::new(config.max_concurrent_loaders));
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                store: Mutex::new(Store { entries: LruCache::unbounded(), size_kb: 0 }),
                loaders: Mutex::new(HashMap::new()),
                slots,
                next_flight: AtomicU64::new(1),
                metrics: MetricsCollector::new(),
            }),
        })
    }

    /// Return the payload for `key`, loading it if needed
    ///
    /// On a hit the entry becomes most recently used and the loader is not
    /// invoked. On a miss the caller either joins the loader already running
    /// for `key` or starts a new one; all callers of one loader receive the
    /// same outcome. A failed load leaves the cache untouched.
    ///
    /// `owner` is attached to the entry created by a loader this call starts.
    /// Joining callers keep their own owner out of the cache.
    ///
    /// # Errors
    /// Returns [`CacheError::LoadFailed`] when the loader fails.
    pub async fn get<F, Fut, E>(
        &self,
        key: K,
        owner: Arc<dyn ResourceOwner>,
        loader: F,
    ) -> Result<Payload, CacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<u8>, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        if let Some(payload) = self.inner.lookup(&key) {
            return Ok(payload);
        }

        let flight = {
            let mut loaders = self.inner.loaders.lock();

            // A loader may have finished between the lookup and taking the lock
            if let Some(payload) = self.inner.lookup(&key) {
                return Ok(payload);
            }
            self.inner.metrics.record_miss();

            match loaders.get(&key).and_then(|flight| flight.future.upgrade()) {
                Some(running) => {
                    self.inner.metrics.record_join();
                    debug!(key = ?key, "joining in-flight payload load");
                    running
                }
                None => {
                    let flight_id = self.inner.next_flight.fetch_add(1, Ordering::Relaxed);
                    let future = self.start_flight(key.clone(), flight_id, owner, loader);
                    if let Some(weak) = future.downgrade() {
                        loaders.insert(key, Flight { id: flight_id, future: weak });
                    }
                    future
                }
            }
        };

        flight.await
    }

    fn start_flight<F, Fut, E>(
        &self,
        key: K,
        flight_id: u64,
        owner: Arc<dyn ResourceOwner>,
        loader: F,
    ) -> LoadFuture
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<u8>, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let weak_inner = Arc::downgrade(&self.inner);
        let slots = Arc::clone(&self.inner.slots);
        let metrics = self.inner.metrics.clone();

        async move {
            let mut guard =
                FlightGuard { inner: weak_inner.clone(), key: key.clone(), flight_id, armed: true };

            let permit = slots.acquire_owned().await.map_err(|_| CacheError::Closed)?;
            metrics.loader_started();
            debug!(key = ?key, "loading payload");
            let result = loader().await;
            metrics.loader_finished();
            drop(permit);

            let outcome = match result {
                Ok(bytes) => Ok(Payload::from(bytes)),
                Err(error) => {
                    metrics.record_load_failure();
                    warn!(key = ?key, error = %error, "payload load failed");
                    Err(CacheError::load_failed(error))
                }
            };

            guard.armed = false;
            if let Some(inner) = weak_inner.upgrade() {
                let loaded = outcome.as_ref().ok().map(|payload| (Arc::clone(payload), owner));
                let released = inner.finish(&key, flight_id, loaded);
                unload_all(released);
            }

            outcome
        }
        .boxed()
        .shared()
    }

    /// Return the cached payload without affecting recency or statistics
    pub fn peek(&self, key: &K) -> Option<Payload> {
        self.inner.store.lock().entries.peek(key).map(|entry| Arc::clone(&entry.payload))
    }

    /// Whether a payload is cached for `key`
    pub fn contains(&self, key: &K) -> bool {
        self.inner.store.lock().entries.contains(key)
    }

    /// Whether a loader is currently running for `key`
    pub fn is_loading(&self, key: &K) -> bool {
        // The upgraded handle may be the last one; drop it after the lock
        let running = self.inner.loaders.lock().get(key).and_then(|flight| flight.future.upgrade());
        running.is_some()
    }

    /// Remove the entry for `key` and unload its owner
    ///
    /// Returns `true` if an entry was removed.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.inner.store.lock().remove(key);
        match removed {
            Some(entry) => {
                self.inner.metrics.record_invalidation();
                entry.owner.unload();
                true
            }
            None => false,
        }
    }

    /// Remove every entry and unload their owners
    pub fn clear(&self) {
        let released: Vec<Arc<dyn ResourceOwner>> = {
            let mut store = self.inner.store.lock();
            let mut released = Vec::with_capacity(store.entries.len());
            while let Some((_, entry)) = store.entries.pop_lru() {
                released.push(entry.owner);
            }
            store.size_kb = 0;
            released
        };

        for _ in &released {
            self.inner.metrics.record_invalidation();
        }
        unload_all(released);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.store.lock().entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current size of all entries in kilobytes
    pub fn size_kb(&self) -> usize {
        self.inner.store.lock().size_kb
    }

    /// The configuration the cache was created with
    pub fn config(&self) -> &ResourceCacheConfig {
        &self.inner.config
    }

    /// Snapshot of the cache statistics
    pub fn stats(&self) -> CacheStats {
        let (entries, size_kb) = {
            let store = self.inner.store.lock();
            (store.entries.len(), store.size_kb)
        };
        self.inner.metrics.snapshot(entries, size_kb, self.inner.config.max_size_kb)
    }
}
