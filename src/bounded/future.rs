//! Cooperative-async guarded bounded map
//!
//! Every operation takes the tokio mutex for one critical section. A
//! contended call suspends the task rather than blocking the thread, and
//! the operation body itself never awaits, so exactly one task makes
//! progress at a time and other ready tasks keep running. Waiter wake
//! order follows the tokio mutex (fair enough to never starve under
//! bounded contention).

use crate::bounded::map::{BoundedMap, EvictionPolicy};
use crate::error::Result;
use std::fmt::Debug;
use std::hash::Hash;
use tokio::sync::Mutex;

/// Async-guarded wrapper around a [`BoundedMap`]
///
/// # Example
///
/// ```
/// use flipcache::bounded::AsyncBoundedMap;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let map = Arc::new(AsyncBoundedMap::new(100));
/// let task = {
///     let map = map.clone();
///     tokio::spawn(async move { map.put("a".to_string(), 1).await })
/// };
/// task.await.unwrap();
/// assert_eq!(map.peek(&"a".to_string()).await, Some(1));
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncBoundedMap<K, V> {
    inner: Mutex<BoundedMap<K, V>>,
}

impl<K, V> AsyncBoundedMap<K, V>
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
    pub async fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.inner.lock().await.put(key, value)
    }

    /// Look up a value, failing with `NotFound` when absent
    pub async fn get(&self, key: &K) -> Result<V> {
        self.inner.lock().await.get(key).cloned()
    }

    /// Look up a value without reordering or failing
    pub async fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().await.peek(key).cloned()
    }

    /// Remove an entry if present; absent keys are a no-op
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().await.remove(key)
    }

    /// Move an entry to the newest position regardless of policy
    pub async fn touch(&self, key: &K) -> bool {
        self.inner.lock().await.touch(key)
    }

    /// Whether the key is currently held
    pub async fn contains(&self, key: &K) -> bool {
        self.inner.lock().await.contains(key)
    }

    /// Current number of entries
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the map holds no entries
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Keys in current order, oldest to newest
    pub async fn keys(&self) -> Vec<K> {
        self.inner.lock().await.keys().cloned().collect()
    }

    /// Values in current order, oldest to newest
    pub async fn values(&self) -> Vec<V> {
        self.inner.lock().await.values().cloned().collect()
    }

    /// Entries in current order, oldest to newest
    pub async fn items(&self) -> Vec<(K, V)> {
        self.inner
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
