//! Cacheable Trait
//!
//! The single-key contract collaborators write against, so that a feed
//! consumer does not need to know which store it is filling.

use std::hash::Hash;

use crate::cache::Cache;

/// Single-key operations every cache store provides.
pub trait Cacheable<K, V>: Send + Sync {
    /// Inserts or overwrites the value for `key`.
    fn set(&self, key: K, value: V);

    /// Returns the value for `key`, or `None` if absent.
    fn get(&self, key: &K) -> Option<V>;

    /// Removes `key`, returning whether it was present.
    fn delete(&self, key: &K) -> bool;

    /// Removes `key` and returns the value it held, in one step.
    fn pop(&self, key: &K) -> Option<V>;
}

impl<K, V> Cacheable<K, V> for Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn set(&self, key: K, value: V) {
        Cache::set(self, key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        Cache::get(self, key)
    }

    fn delete(&self, key: &K) -> bool {
        Cache::delete(self, key)
    }

    fn pop(&self, key: &K) -> Option<V> {
        Cache::pop(self, key)
    }
}
