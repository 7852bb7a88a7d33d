//! # Tiered Cache
//!
//! Composes a bounded FIFO fast tier with a durable key-value backend:
//! read-through with opportunistic repopulation, synchronous
//! write-through, per-entry expiration with optional refresh on read, and
//! default-value materialization.
//!
//! Values in the fast tier keep the caller's native shape; only the
//! backend boundary goes through the configured codec.

pub mod cache;
pub mod config;

pub use cache::{CacheStats, Keys, TieredCache};
pub use config::{TieredConfig, TieredConfigBuilder};
