//! # Backend contract
//!
//! The tiered cache delegates durability to an externally supplied
//! key-value store behind the [`Backend`] trait: string keys, string
//! encoded values, per-key expiration, and cursor-paged keyspace scans.
//! The core is agnostic to the transport or persistence engine behind an
//! implementation as long as these semantics hold.
//!
//! All calls are synchronous from the core's perspective; failures map to
//! [`CacheError::Backend`](crate::CacheError::Backend) and propagate to
//! the caller unchanged - the core never retries or suppresses them.
//! Timeouts and retries, if wanted, belong inside the implementation.

pub mod memory;

pub use memory::MemoryBackend;

use crate::error::Result;
use std::time::Duration;

/// One page of a cursor-driven keyspace scan
///
/// A returned `cursor` of 0 marks the traversal as exhausted; any other
/// value is passed to the next [`Backend::scan_page`] call. Pages may be
/// empty before the traversal completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next page; 0 when the scan is complete
    pub cursor: u64,
    /// Raw keys found in this page, in unspecified order
    pub keys: Vec<String>,
}

impl ScanPage {
    /// Whether this page ends the traversal
    pub fn is_last(&self) -> bool {
        self.cursor == 0
    }
}

/// Contract the tiered cache requires from a durable key-value store
pub trait Backend {
    /// Fetch the raw encoded value for a key, or `None` when absent
    /// (including backend-side expiration, which the core only ever
    /// observes as a miss)
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a key with a raw value
    ///
    /// `expire` of `Some` applies that time-to-live; `None` clears any
    /// previously set expiration. A write fully replaces prior expiration
    /// state either way.
    fn set(&self, key: &str, value: &str, expire: Option<Duration>) -> Result<()>;

    /// Delete a key; absence is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// Whether the key currently exists
    fn exists(&self, key: &str) -> Result<bool>;

    /// Reset the remaining time-to-live of an existing key; missing keys
    /// are a no-op
    fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Fetch one page of keys sharing `prefix`
    ///
    /// Start with cursor 0 and at most `count` keys per page; iterate
    /// until the returned page [`is_last`](ScanPage::is_last). Order is
    /// unspecified and need not match insertion order.
    fn scan_page(&self, prefix: &str, cursor: u64, count: usize) -> Result<ScanPage>;
}

// Shared handles delegate, so one backend can sit behind several logical
// caches (distinguished by namespace prefix).
impl<B: Backend + ?Sized> Backend for &B {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str, expire: Option<Duration>) -> Result<()> {
        (**self).set(key, value, expire)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        (**self).expire(key, ttl)
    }

    fn scan_page(&self, prefix: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        (**self).scan_page(prefix, cursor, count)
    }
}

impl<B: Backend + ?Sized> Backend for std::sync::Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str, expire: Option<Duration>) -> Result<()> {
        (**self).set(key, value, expire)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        (**self).expire(key, ttl)
    }

    fn scan_page(&self, prefix: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        (**self).scan_page(prefix, cursor, count)
    }
}
