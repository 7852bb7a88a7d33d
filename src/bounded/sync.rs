//! Exclusive-lock guarded bounded map for multi-thread access
//!
//! Every public operation acquires the mutex for its full duration, so
//! individual operations are linearizable; multi-operation sequences are
//! not. Snapshot accessors hold the lock for the whole snapshot and can
//! never observe a partially-mutated structure.

use crate::bounded::map::{BoundedMap, EvictionPolicy};
use crate::error::Result;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Thread-safe wrapper around a [`BoundedMap`]
///
/// Callers from parallel threads block until the lock is free. Guarded
/// accessors return owned clones since references cannot outlive the
/// critical section.
///
/// # Example
///
/// ```
/// use flipcache::bounded::SyncBoundedMap;
/// use std::sync::Arc;
///
/// let map = Arc::new(SyncBoundedMap::new(100));
/// let handle = {
///     let map = map.clone();
///     std::thread::spawn(move || map.put("a".to_string(), 1))
/// };
/// handle.join().unwrap();
/// assert_eq!(map.peek(&"a".to_string()), Some(1));
/// ```
#[derive(Debug)]
pub struct SyncBoundedMap<K, V> {
    inner: Mutex<BoundedMap<K, V>>,
}

impl<K, V> SyncBoundedMap<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Create a FIFO-ordered map holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::Fifo)
    }

    /// Create a map with an explicit eviction policy
    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            inner: Mutex::new(BoundedMap::with_policy(capacity, policy)),
        }
    }

    /// Insert or update an entry, returning any evicted entry
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.guard().put(key, value)
    }

    /// Look up a value, failing with `NotFound` when absent
    pub fn get(&self, key: &K) -> Result<V> {
        self.guard().get(key).cloned()
    }

    /// Look up a value without reordering or failing
    pub fn peek(&self, key: &K) -> Option<V> {
        self.guard().peek(key).cloned()
    }

    /// Remove an entry if present; absent keys are a no-op
    pub fn remove(&self, key: &K) -> Option<V> {
        self.guard().remove(key)
    }

    /// Move an entry to the newest position regardless of policy
    pub fn touch(&self, key: &K) -> bool {
        self.guard().touch(key)
    }

    /// Whether the key is currently held
    pub fn contains(&self, key: &K) -> bool {
        self.guard().contains(key)
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Keys in current order, oldest to newest
    pub fn keys(&self) -> Vec<K> {
        self.guard().keys().cloned().collect()
    }

    /// Values in current order, oldest to newest
    pub fn values(&self) -> Vec<V> {
        self.guard().values().cloned().collect()
    }

    /// Entries in current order, oldest to newest
    pub fn items(&self) -> Vec<(K, V)> {
        self.guard()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn guard(&self) -> MutexGuard<'_, BoundedMap<K, V>> {
        // A panic while the guard is held can only come from a `K::clone`
        // or `V::clone` call, and those run after the map's link updates
        // have completed, so the poisoned state is still structurally
        // sound and the guard is recovered.
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("recovering bounded map mutex from poisoned state");
            poisoned.into_inner()
        })
    }
}
