//! Cache statistics and metrics tracking
//!
//! Tracks hit rates, loader activity and evictions for [`super::ResourceCache`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,

    /// Current size of all entries in kilobytes
    pub size_kb: usize,

    /// Configured size budget in kilobytes
    pub max_size_kb: usize,

    /// Lookups served from the cache
    pub hits: u64,

    /// Lookups that had to wait for a loader (new or joined)
    pub misses: u64,

    /// Lookups that joined a loader already in flight for the same key
    pub joins: u64,

    /// Loaders started
    pub loads: u64,

    /// Loaders that returned an error
    pub load_failures: u64,

    /// Entries removed by the LRU policy
    pub evictions: u64,

    /// Entries removed through explicit invalidation
    pub invalidations: u64,

    /// Loaders running right now
    pub active_loaders: usize,

    /// Highest number of loaders observed running at once
    pub peak_active_loaders: usize,
}

impl CacheStats {
    /// Calculate hit rate (hits / total lookups)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate fill percentage (size / budget)
    pub fn fill_percentage(&self) -> f64 {
        if self.max_size_kb == 0 {
            0.0
        } else {
            self.size_kb as f64 / self.max_size_kb as f64
        }
    }
}

/// Thread-safe metrics collector for cache operations
///
/// Uses atomic operations so recording never takes the cache locks.
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    joins: Arc<AtomicU64>,
    loads: Arc<AtomicU64>,
    load_failures: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
    invalidations: Arc<AtomicU64>,
    active_loaders: Arc<AtomicUsize>,
    peak_active_loaders: Arc<AtomicUsize>,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_join(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a loader entering its slot
    pub(crate) fn loader_started(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let active = self.active_loaders.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active_loaders.fetch_max(active, Ordering::SeqCst);
    }

    /// Record a loader leaving its slot
    pub(crate) fn loader_finished(&self) {
        self.active_loaders.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn snapshot(&self, entries: usize, size_kb: usize, max_size_kb: usize) -> CacheStats {
        CacheStats {
            entries,
            size_kb,
            max_size_kb,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            active_loaders: self.active_loaders.load(Ordering::SeqCst),
            peak_active_loaders: self.peak_active_loaders.load(Ordering::SeqCst),
        }
    }
}
