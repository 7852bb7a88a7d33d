//! Tiered cache: bounded fast tier fronting a durable backend
//!
//! Reads consult the fast tier first and fall through to the backend,
//! opportunistically repopulating the fast tier on a hit there. Writes go
//! to both tiers synchronously. The fast tier holds native values; the
//! backend holds codec-encoded strings.

use crate::backend::Backend;
use crate::bounded::BoundedMap;
use crate::codec::{CacheValue, Codec, Key, KeyType};
use crate::error::{CacheError, Result};
use crate::tiered::config::TieredConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

/// Keys fetched per backend scan page
const SCAN_PAGE_SIZE: usize = 100;

/// Counters maintained by a [`TieredCache`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads served from the fast tier
    pub local_hits: u64,

    /// Reads served via backend read-through
    pub backend_hits: u64,

    /// Reads that missed both tiers
    pub misses: u64,

    /// Write-throughs issued to the backend
    pub writes: u64,

    /// Fast-tier entries evicted by capacity pressure
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of reads served from either tier, as a percentage
    pub fn hit_rate(&self) -> f64 {
        let hits = self.local_hits + self.backend_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ local_hits: {}, backend_hits: {}, misses: {}, hit_rate: {:.2}%, writes: {}, evictions: {} }}",
            self.local_hits,
            self.backend_hits,
            self.misses,
            self.hit_rate(),
            self.writes,
            self.evictions
        )
    }
}

/// Two-tier cache composing a bounded FIFO fast tier with a durable
/// key-value backend
///
/// The cache carries no internal synchronization: mutating operations
/// take `&mut self`, so concurrent use from parallel contexts must be
/// serialized by the caller. The backend handles its own cross-process
/// safety; the two tiers are not kept consistent under external mutation
/// of the backend namespace.
///
/// # Example
///
/// ```
/// use flipcache::{MemoryBackend, TieredCache, TieredConfig};
/// use serde_json::json;
///
/// let config = TieredConfig::builder().name("users").local_max(100).build();
/// let mut cache = TieredCache::new(config, MemoryBackend::new()).unwrap();
///
/// cache.set("alice", json!("admin")).unwrap();
/// assert_eq!(cache.get("alice").unwrap(), Some(json!("admin")));
/// assert_eq!(cache.get("nobody").unwrap(), None);
/// ```
pub struct TieredCache<B: Backend> {
    config: TieredConfig,
    local: BoundedMap<Key, CacheValue>,
    backend: B,
    codec: Codec,
    stats: CacheStats,
}

impl<B: Backend> TieredCache<B> {
    /// Create a cache for a non-custom value type
    ///
    /// Fails with [`CacheError::Config`] when the configuration is
    /// invalid, including a `Custom` value type without a codec - use
    /// [`with_codec`](Self::with_codec) for that.
    pub fn new(config: TieredConfig, backend: B) -> Result<Self> {
        let codec = Codec::for_value_type(config.value_type)?;
        Self::with_codec(config, codec, backend)
    }

    /// Create a cache with an explicit codec (required for `Custom`)
    pub fn with_codec(config: TieredConfig, codec: Codec, backend: B) -> Result<Self> {
        config.validate()?;
        if codec.value_type() != config.value_type {
            return Err(CacheError::Config(format!(
                "codec serves {:?} but configuration declares {:?}",
                codec.value_type(),
                config.value_type
            )));
        }

        info!(
            name = %config.name,
            local_max = config.local_max,
            "initializing tiered cache"
        );

        Ok(Self {
            local: BoundedMap::new(config.local_max),
            config,
            backend,
            codec,
            stats: CacheStats::default(),
        })
    }

    /// Read a value
    ///
    /// Fast-tier hits return the stored value as-is without reordering.
    /// Fast-tier misses read through the backend: the raw value is
    /// decoded, inserted into the fast tier (evicting the oldest entry
    /// over capacity), and the backend TTL is refreshed when configured.
    /// A miss in both tiers materializes the configured default value via
    /// a full write, or returns `None` without one.
    pub fn get(&mut self, key: impl Into<Key>) -> Result<Option<CacheValue>> {
        let key = key.into().coerce(self.config.key_type)?;

        if let Some(value) = self.local.peek(&key) {
            let value = value.clone();
            self.stats.local_hits += 1;
            debug!(%key, "fast-tier hit");
            return Ok(Some(value));
        }

        let raw_key = self.config.backend_key(&key);
        match self.backend.get(&raw_key)? {
            Some(raw) => {
                let value = self.codec.decode(&raw)?;
                self.stats.backend_hits += 1;
                debug!(%key, "backend hit, repopulating fast tier");

                if let Some((evicted, _)) = self.local.put(key, value.clone()) {
                    self.stats.evictions += 1;
                    debug!(key = %evicted, "fast-tier eviction");
                }

                if self.config.refresh_expire_on_get {
                    if let Some(expire) = self.config.expire {
                        self.backend.expire(&raw_key, expire)?;
                    }
                }

                Ok(Some(value))
            }
            None => {
                self.stats.misses += 1;
                debug!(%key, "miss in both tiers");
                match self.config.default_value.clone() {
                    Some(default) => {
                        self.set_coerced(key, default.clone())?;
                        Ok(Some(default))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Write a value to both tiers
    ///
    /// The fast tier stores the value as-is; existing keys are
    /// overwritten in place without reordering, so a frequently
    /// overwritten key keeps its original insertion age for eviction
    /// purposes. The backend receives the encoded value with the
    /// configured expiration (a write always resets the TTL, or clears it
    /// when none is configured).
    pub fn set(&mut self, key: impl Into<Key>, value: CacheValue) -> Result<()> {
        let key = key.into().coerce(self.config.key_type)?;
        self.set_coerced(key, value)
    }

    /// Delete a key from both tiers; absence anywhere is not an error
    pub fn delete(&mut self, key: impl Into<Key>) -> Result<()> {
        let key = key.into().coerce(self.config.key_type)?;
        self.local.remove(&key);
        self.backend.delete(&self.config.backend_key(&key))
    }

    /// Whether the key is present in the fast tier or the backend
    pub fn contains(&self, key: impl Into<Key>) -> Result<bool> {
        let key = key.into().coerce(self.config.key_type)?;
        if self.local.contains(&key) {
            return Ok(true);
        }
        self.backend.exists(&self.config.backend_key(&key))
    }

    /// Lazily enumerate all keys in the backend namespace
    ///
    /// Non-restartable; ordering is unspecified. Scan failures surface as
    /// `Err` items.
    pub fn keys(&self) -> Keys<'_, B> {
        Keys {
            backend: &self.backend,
            prefix: self.config.scan_prefix(),
            key_type: self.config.key_type,
            cursor: 0,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Count backend keys under the namespace
    ///
    /// Full cursor-driven traversal: cost is proportional to the backend
    /// keyspace under this namespace, not to the fast tier.
    pub fn len(&self) -> Result<usize> {
        let prefix = self.config.scan_prefix();
        let mut count = 0;
        let mut cursor = 0;
        loop {
            let page = self.backend.scan_page(&prefix, cursor, SCAN_PAGE_SIZE)?;
            count += page.keys.len();
            if page.is_last() {
                return Ok(count);
            }
            cursor = page.cursor;
        }
    }

    /// Whether the backend namespace holds no keys
    pub fn is_empty(&self) -> Result<bool> {
        let prefix = self.config.scan_prefix();
        let mut cursor = 0;
        loop {
            let page = self.backend.scan_page(&prefix, cursor, SCAN_PAGE_SIZE)?;
            if !page.keys.is_empty() {
                return Ok(false);
            }
            if page.is_last() {
                return Ok(true);
            }
            cursor = page.cursor;
        }
    }

    /// Move a fast-tier entry to the newest position and reset the
    /// backend TTL when an expiration duration is configured
    pub fn refresh(&mut self, key: impl Into<Key>) -> Result<()> {
        let key = key.into().coerce(self.config.key_type)?;
        self.local.touch(&key);
        if let Some(expire) = self.config.expire {
            self.backend.expire(&self.config.backend_key(&key), expire)?;
        }
        Ok(())
    }

    /// Direct snapshot of the fast tier, for backend-independent
    /// inspection
    pub fn local(&self) -> &BoundedMap<Key, CacheValue> {
        &self.local
    }

    /// The backend this cache writes through to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The active configuration
    pub fn config(&self) -> &TieredConfig {
        &self.config
    }

    fn set_coerced(&mut self, key: Key, value: CacheValue) -> Result<()> {
        let raw = self.codec.encode(&value)?;

        // Existing keys are overwritten in place: the fast tier tracks
        // insertion age, not write recency.
        if self.local.contains(&key) {
            self.local.replace(&key, value);
        } else if let Some((evicted, _)) = self.local.put(key.clone(), value) {
            self.stats.evictions += 1;
            debug!(key = %evicted, "fast-tier eviction");
        }

        self.backend
            .set(&self.config.backend_key(&key), &raw, self.config.expire)?;
        self.stats.writes += 1;
        Ok(())
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for TieredCache<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .field("local_len", &self.local.len())
            .field("backend", &self.backend)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Lazy, non-restartable iterator over the backend namespace keys
pub struct Keys<'a, B: Backend> {
    backend: &'a B,
    prefix: String,
    key_type: KeyType,
    cursor: u64,
    buffer: VecDeque<String>,
    done: bool,
}

impl<B: Backend> Iterator for Keys<'_, B> {
    type Item = Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.buffer.pop_front() {
                let bare = raw.strip_prefix(&self.prefix).unwrap_or(&raw).to_string();
                return Some(Key::Str(bare).coerce(self.key_type));
            }
            if self.done {
                return None;
            }
            match self.backend.scan_page(&self.prefix, self.cursor, SCAN_PAGE_SIZE) {
                Ok(page) => {
                    self.done = page.is_last();
                    self.cursor = page.cursor;
                    self.buffer.extend(page.keys);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
