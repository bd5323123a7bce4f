//! Cache Statistics Module
//!
//! Tracks cache access counters. All counters are atomic so that reads taken
//! under the shared lock can record hits and misses without upgrading it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Live access counters owned by a [`Cache`](super::Cache).
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Lookups that found a value
    hits: AtomicU64,
    /// Lookups that found nothing
    misses: AtomicU64,
    /// Every `set` call, insert or overwrite
    sets: AtomicU64,
    /// `set` calls that added a new key
    inserts: AtomicU64,
    /// Entries removed by `delete`, `pop` and `clear`
    deletes: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a `set`; `inserted` is true when the key was previously absent.
    #[inline]
    pub fn record_set(&self, inserted: bool) {
        self.sets.fetch_add(1, Ordering::Relaxed);
        if inserted {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_delete(&self) {
        self.record_deletes(1);
    }

    /// Records `count` entries removed at once.
    #[inline]
    pub fn record_deletes(&self, count: u64) {
        self.deletes.fetch_add(count, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the current counter values together with the entry count.
    pub fn snapshot(&self, total_entries: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub inserts: u64,
    pub deletes: u64,
    /// Number of entries in the cache when the snapshot was taken
    pub total_entries: usize,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
