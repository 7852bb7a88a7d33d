//! # Bounded Ordered Maps
//!
//! Capacity-limited associative containers with configurable eviction:
//! insertion-order FIFO or recency-order LRU, both with O(1) insert,
//! lookup, and eviction.
//!
//! Three interchangeable concurrency variants share identical
//! per-operation semantics:
//!
//! - [`BoundedMap`]: unsynchronized, for single-owner use; the base
//!   implementation the guarded variants wrap.
//! - [`SyncBoundedMap`]: exclusive-lock guarded, for parallel threads.
//! - [`AsyncBoundedMap`]: cooperative-async guarded, for many concurrent
//!   tasks on an async scheduler.

pub mod future;
pub mod map;
pub mod sync;

pub use future::AsyncBoundedMap;
pub use map::{BoundedMap, EvictionPolicy, Iter};
pub use sync::SyncBoundedMap;
