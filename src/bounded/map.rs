//! Capacity-bounded ordered map with O(1) eviction bookkeeping
//!
//! The map pairs a hash index (key -> slot) with an intrusive doubly-linked
//! order threaded through a slot arena, so move-to-newest and evict-oldest
//! are constant-time link operations rather than container rescans. Freed
//! slots are recycled through a free list.

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Sentinel slot index marking the end of the order links
const NIL: usize = usize::MAX;

/// Eviction discipline for a [`BoundedMap`]
///
/// - `Fifo`: order reflects insertion time only. Re-inserting an existing
///   key refreshes it to the newest position; plain reads never reorder.
/// - `Lru`: order reflects recency. Any successful read or write moves the
///   key to the newest position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Insertion-order eviction (default)
    #[default]
    Fifo,
    /// Recency-order eviction
    Lru,
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Bounded associative container keeping entries in a maintained order
///
/// Holds at most `capacity` entries; the bound is enforced synchronously
/// inside every mutating operation. Order runs oldest to newest. The map
/// itself carries no synchronization - see
/// [`SyncBoundedMap`](crate::bounded::SyncBoundedMap) and
/// [`AsyncBoundedMap`](crate::bounded::AsyncBoundedMap) for guarded
/// variants with identical per-operation semantics.
///
/// # Example
///
/// ```
/// use flipcache::bounded::{BoundedMap, EvictionPolicy};
///
/// let mut map = BoundedMap::with_policy(2, EvictionPolicy::Lru);
/// map.put("a", 1);
/// map.put("b", 2);
/// map.get(&"a").unwrap();           // "a" is now the newest
/// map.put("c", 3);                  // evicts "b", the oldest
/// assert!(!map.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct BoundedMap<K, V> {
    capacity: usize,
    policy: EvictionPolicy,
    index: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl<K, V> BoundedMap<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create a FIFO-ordered map holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::Fifo)
    }

    /// Create a map with an explicit eviction policy
    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            capacity,
            policy,
            index: HashMap::with_capacity(capacity.min(1024)),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Insert or update an entry, returning the evicted entry if the
    /// insertion pushed the map over capacity
    ///
    /// Existing keys are refreshed to the newest position under both
    /// policies (re-insertion semantics). With capacity 0 every insertion
    /// immediately evicts the entry it just added.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(node) = self.slots[idx].as_mut() {
                node.value = value;
            }
            self.detach(idx);
            self.push_newest(idx);
            return None;
        }

        let idx = self.alloc(Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        self.index.insert(key, idx);
        self.push_newest(idx);

        if self.index.len() > self.capacity {
            self.evict_oldest()
        } else {
            None
        }
    }

    /// Look up a value, failing with [`CacheError::NotFound`] when absent
    ///
    /// Under `Lru` a hit moves the key to the newest position; under
    /// `Fifo` reads never reorder. Callers wanting a non-failing,
    /// non-reordering lookup use [`peek`](Self::peek).
    pub fn get(&mut self, key: &K) -> Result<&V> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| CacheError::NotFound(format!("{key:?}")))?;

        if self.policy == EvictionPolicy::Lru {
            self.detach(idx);
            self.push_newest(idx);
        }

        match self.slots[idx].as_ref() {
            Some(node) => Ok(&node.value),
            None => Err(CacheError::NotFound(format!("{key:?}"))),
        }
    }

    /// Look up a value without reordering or failing
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &idx = self.index.get(key)?;
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    /// Overwrite an existing entry in place without reordering
    ///
    /// Returns the previous value, or `None` (and writes nothing) when
    /// the key is absent. This is the write primitive behind the tiered
    /// cache's overwrite-without-reorder fast-tier semantics.
    pub fn replace(&mut self, key: &K, value: V) -> Option<V> {
        let &idx = self.index.get(key)?;
        self.slots[idx]
            .as_mut()
            .map(|node| std::mem::replace(&mut node.value, value))
    }

    /// Remove an entry if present
    ///
    /// Absent keys are a no-op, not an error, so idempotent cleanup by
    /// callers needs no membership check.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.detach(idx);
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        Some(node.value)
    }

    /// Move an entry to the newest position regardless of policy
    ///
    /// Returns whether the key was present.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.detach(idx);
                self.push_newest(idx);
                true
            }
            None => false,
        }
    }

    /// Whether the key is currently held
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Active eviction policy
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Iterate entries oldest to newest
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            cursor: self.head,
        }
    }

    /// Keys in current order, oldest to newest
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Values in current order, oldest to newest
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        if prev != NIL {
            if let Some(node) = self.slots[prev].as_mut() {
                node.next = next;
            }
        } else {
            self.head = next;
        }

        if next != NIL {
            if let Some(node) = self.slots[next].as_mut() {
                node.prev = prev;
            }
        } else {
            self.tail = prev;
        }
    }

    fn push_newest(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = old_tail;
            node.next = NIL;
        }
        if old_tail != NIL {
            if let Some(node) = self.slots[old_tail].as_mut() {
                node.next = idx;
            }
        } else {
            self.head = idx;
        }
        self.tail = idx;
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let idx = self.head;
        if idx == NIL {
            return None;
        }
        self.detach(idx);
        let node = self.slots[idx].take()?;
        self.index.remove(&node.key);
        self.free.push(idx);
        Some((node.key, node.value))
    }
}

/// Ordered iterator over a [`BoundedMap`], oldest to newest
pub struct Iter<'a, K, V> {
    map: &'a BoundedMap<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = self.map.slots[self.cursor].as_ref()?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered_keys(map: &BoundedMap<&'static str, i32>) -> Vec<&'static str> {
        map.keys().copied().collect()
    }

    #[test]
    fn test_put_and_get() {
        let mut map = BoundedMap::new(4);
        map.put("a", 1);
        map.put("b", 2);

        assert_eq!(map.get(&"a").unwrap(), &1);
        assert_eq!(map.len(), 2);
        assert!(map.contains(&"b"));
        assert!(!map.contains(&"c"));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let mut map: BoundedMap<&str, i32> = BoundedMap::new(4);
        let err = map.get(&"missing").unwrap_err();
        assert!(matches!(err, CacheError::NotFound(_)));
    }

    #[test]
    fn test_fifo_read_never_reorders() {
        // Capacity-4 FIFO: insert a,b,c,d; read a; insert e
        // -> a is evicted and order is [b,c,d,e]
        let mut map = BoundedMap::new(4);
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            map.put(k, i as i32);
        }
        map.get(&"a").unwrap();
        let evicted = map.put("e", 4);

        assert_eq!(evicted.map(|(k, _)| k), Some("a"));
        assert_eq!(ordered_keys(&map), vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn test_lru_read_moves_to_newest() {
        // Capacity-4 LRU: insert a,b,c,d; read a; insert e
        // -> b is evicted and order is [c,d,a,e]
        let mut map = BoundedMap::with_policy(4, EvictionPolicy::Lru);
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            map.put(k, i as i32);
        }
        map.get(&"a").unwrap();
        let evicted = map.put("e", 4);

        assert_eq!(evicted.map(|(k, _)| k), Some("b"));
        assert_eq!(ordered_keys(&map), vec!["c", "d", "a", "e"]);
    }

    #[test]
    fn test_fifo_reinsert_refreshes_position() {
        let mut map = BoundedMap::new(3);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);
        map.put("a", 10); // re-insertion moves "a" to newest

        assert_eq!(ordered_keys(&map), vec!["b", "c", "a"]);
        let evicted = map.put("d", 4);
        assert_eq!(evicted.map(|(k, _)| k), Some("b"));
        assert_eq!(map.get(&"a").unwrap(), &10);
    }

    #[test]
    fn test_capacity_bound_holds() {
        let mut map = BoundedMap::new(3);
        for i in 0..50 {
            map.put(i, i);
            assert!(map.len() <= 3);
        }
        // The three most recent insertions survive
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![47, 48, 49]);
    }

    #[test]
    fn test_capacity_zero_is_pass_through() {
        let mut map = BoundedMap::new(0);
        let evicted = map.put("a", 1);
        assert_eq!(evicted, Some(("a", 1)));
        assert!(map.is_empty());
        assert!(!map.contains(&"a"));
    }

    #[test]
    fn test_peek_does_not_reorder() {
        let mut map = BoundedMap::with_policy(3, EvictionPolicy::Lru);
        map.put("a", 1);
        map.put("b", 2);

        assert_eq!(map.peek(&"a"), Some(&1));
        assert_eq!(ordered_keys(&map), vec!["a", "b"]);
        assert_eq!(map.peek(&"missing"), None);
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut map = BoundedMap::new(3);
        map.put("a", 1);
        map.put("b", 2);

        assert_eq!(map.replace(&"a", 10), Some(1));
        assert_eq!(ordered_keys(&map), vec!["a", "b"]);
        assert_eq!(map.replace(&"missing", 1), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut map = BoundedMap::new(3);
        map.put("a", 1);

        assert_eq!(map.remove(&"a"), Some(1));
        assert_eq!(map.remove(&"a"), None);
        assert_eq!(map.remove(&"never"), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_middle_relinks_order() {
        let mut map = BoundedMap::new(4);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);

        map.remove(&"b");
        assert_eq!(ordered_keys(&map), vec!["a", "c"]);

        // Freed slot is recycled without disturbing order
        map.put("d", 4);
        assert_eq!(ordered_keys(&map), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_touch_moves_to_newest() {
        let mut map = BoundedMap::new(3);
        map.put("a", 1);
        map.put("b", 2);

        assert!(map.touch(&"a"));
        assert_eq!(ordered_keys(&map), vec!["b", "a"]);
        assert!(!map.touch(&"missing"));
    }

    #[test]
    fn test_iter_snapshot_order() {
        let mut map = BoundedMap::new(4);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);

        let items: Vec<(&str, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(items, vec![("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_single_entry_evict_and_refill() {
        let mut map = BoundedMap::new(1);
        map.put("a", 1);
        let evicted = map.put("b", 2);

        assert_eq!(evicted, Some(("a", 1)));
        assert_eq!(ordered_keys(&map), vec!["b"]);
    }
}
