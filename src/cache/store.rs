//! Cache Store Module
//!
//! Generic concurrent key-value map guarded by a single reader/writer lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::cache::{CacheStats, StatsSnapshot};

// == Cache ==
/// Concurrent in-memory cache.
///
/// Reads (`get`, `keys`, `values`, `items`, `len`) share the lock and never
/// block each other. Writes (`set`, `delete`, `pop`, `clear`) hold it
/// exclusively for a single map operation. Guards are scoped to each call,
/// so a panic inside one call cannot leave the cache locked.
///
/// Share it between threads or tasks with `Arc<Cache<K, V>>`.
#[derive(Debug)]
pub struct Cache<K, V> {
    /// Key-value storage; its length is the live entry count
    entries: RwLock<HashMap<K, V>>,
    /// Access counters
    stats: CacheStats,
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Inserts or overwrites the value for `key`.
    ///
    /// The entry count only grows when `key` was absent.
    pub fn set(&self, key: K, value: V) {
        let inserted = self.entries.write().insert(key, value).is_none();
        self.stats.record_set(inserted);
    }

    // == Delete ==
    /// Removes `key`, returning whether it was present.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            self.stats.record_delete();
        }
        removed
    }

    // == Pop ==
    /// Removes `key` and returns the value it held.
    ///
    /// Lookup and removal happen under one exclusive guard, so no other
    /// caller can overwrite or read the entry between the two steps.
    pub fn pop<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.entries.write().remove(key);
        if value.is_some() {
            self.stats.record_delete();
        }
        value
    }

    /// Returns true if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().contains_key(key)
    }

    /// Removes every entry, returning how many were removed.
    ///
    /// Each removed entry counts as a delete in [`stats`](Self::stats).
    pub fn clear(&self) -> usize {
        let removed = {
            let mut entries = self.entries.write();
            let removed = entries.len();
            entries.clear();
            removed
        };
        self.stats.record_deletes(removed as u64);
        removed
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // == Stats ==
    /// Returns current access counters and the entry count.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.len())
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Get ==
    /// Returns a copy of the value for `key`, or `None` if absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.entries.read().get(key).cloned();
        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        value
    }

    // == Values ==
    /// Point-in-time copy of every value, in unspecified order.
    pub fn values(&self) -> Vec<V> {
        let entries = self.entries.read();
        let mut values = Vec::with_capacity(entries.len());
        values.extend(entries.values().cloned());
        values
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Keys ==
    /// Point-in-time copy of every key, in unspecified order.
    pub fn keys(&self) -> Vec<K> {
        let entries = self.entries.read();
        let mut keys = Vec::with_capacity(entries.len());
        keys.extend(entries.keys().cloned());
        keys
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Items ==
    /// Point-in-time copy of every key-value pair, taken under one guard.
    pub fn items(&self) -> Vec<(K, V)> {
        let entries = self.entries.read();
        entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
