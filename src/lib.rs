//! # flipcache
//!
//! A two-tier caching engine: capacity-bounded ordered maps with FIFO or
//! LRU eviction, and a tiered cache layering such a map as a fast local
//! tier in front of a durable key-value backend.
//!
//! ## Features
//!
//! - Bounded ordered maps with O(1) insert, lookup, and eviction
//! - FIFO (insertion-order) and LRU (recency-order) eviction policies
//! - Three concurrency variants: unsynchronized, mutex-guarded, and
//!   cooperative-async guarded
//! - Read-through / write-through tiered caching over any [`Backend`]
//! - Per-entry backend expiration with optional refresh on read
//! - String, integer, JSON, or fully custom value marshaling
//! - Default-value materialization on misses
//!
//! ## Bounded maps
//!
//! ```
//! use flipcache::bounded::{BoundedMap, EvictionPolicy};
//!
//! let mut recent = BoundedMap::with_policy(2, EvictionPolicy::Lru);
//! recent.put("a", 1);
//! recent.put("b", 2);
//! recent.get(&"a").unwrap(); // "a" is now the newest
//! recent.put("c", 3);        // evicts "b"
//! assert_eq!(recent.keys().copied().collect::<Vec<_>>(), vec!["a", "c"]);
//! ```
//!
//! ## Tiered caching
//!
//! ```
//! use flipcache::{KeyType, MemoryBackend, TieredCache, TieredConfig, ValueType};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let config = TieredConfig::builder()
//!     .name("sessions")
//!     .local_max(1000)
//!     .expire(Duration::from_secs(3600))
//!     .key_type(KeyType::Int)
//!     .value_type(ValueType::Json)
//!     .refresh_expire_on_get(true)
//!     .build();
//!
//! let mut cache = TieredCache::new(config, MemoryBackend::new()).unwrap();
//!
//! cache.set(42i64, json!({"user": "alice"})).unwrap();
//! assert_eq!(cache.get(42i64).unwrap(), Some(json!({"user": "alice"})));
//! ```
//!
//! The fast tier stores values in their native shape; encode/decode apply
//! only at the backend boundary. The tiered cache carries no internal
//! synchronization - wrap it or serialize access externally when sharing
//! across threads or tasks.

pub mod backend;
pub mod bounded;
pub mod codec;
pub mod error;
pub mod tiered;

// Re-export main types for convenience
pub use backend::{Backend, MemoryBackend, ScanPage};
pub use bounded::{AsyncBoundedMap, BoundedMap, EvictionPolicy, SyncBoundedMap};
pub use codec::{CacheValue, Codec, DecodeFn, EncodeFn, Key, KeyType, ValueType};
pub use error::{CacheError, Result};
pub use tiered::{CacheStats, Keys, TieredCache, TieredConfig, TieredConfigBuilder};
