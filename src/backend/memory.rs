//! In-process reference backend
//!
//! A hermetic [`Backend`] implementation over a guarded hash map with
//! lazy expiration: deadlines are monotonic `Instant`s checked on access
//! and purged during scans. It honors the full contract, cursor scans
//! included, so the tiered cache can be exercised without any external
//! store.

use crate::backend::{Backend, ScanPage};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone)]
struct Stored {
    value: String,
    expires_at: Option<Instant>,
}

impl Stored {
    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(deadline) if Instant::now() >= deadline)
    }
}

/// In-memory key-value backend with per-key expiration
///
/// # Example
///
/// ```
/// use flipcache::backend::{Backend, MemoryBackend};
///
/// let backend = MemoryBackend::new();
/// backend.set("greeting", "hello", None).unwrap();
/// assert_eq!(backend.get("greeting").unwrap().as_deref(), Some("hello"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Stored>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time-to-live for a key, if it exists and carries one
    ///
    /// Inspection hook for tests and monitoring; not part of the
    /// [`Backend`] contract.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let guard = self.guard();
        let stored = guard.get(key)?;
        if stored.is_expired() {
            return None;
        }
        stored
            .expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, Stored>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned: PoisonError<_>| {
                warn!("recovering memory backend mutex from poisoned state");
                poisoned.into_inner()
            })
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut guard = self.guard();
        match guard.get(key) {
            Some(stored) if stored.is_expired() => {
                guard.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, expire: Option<Duration>) -> Result<()> {
        let expires_at = expire.map(|ttl| Instant::now() + ttl);
        self.guard().insert(
            key.to_string(),
            Stored {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.guard().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        let mut guard = self.guard();
        match guard.get(key) {
            Some(stored) if stored.is_expired() => {
                guard.remove(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut guard = self.guard();
        if matches!(guard.get(key), Some(stored) if stored.is_expired()) {
            guard.remove(key);
            return Ok(());
        }
        if let Some(stored) = guard.get_mut(key) {
            stored.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    fn scan_page(&self, prefix: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        let mut guard = self.guard();
        guard.retain(|_, stored| !stored.is_expired());

        // Stable order across pages so offset cursors stay meaningful
        // while the traversal runs.
        let mut matching: Vec<&String> = guard
            .keys()
            .filter(|key| key.starts_with(prefix))
            .collect();
        matching.sort();

        let offset = cursor as usize;
        let keys: Vec<String> = matching
            .iter()
            .skip(offset)
            .take(count.max(1))
            .map(|key| (*key).clone())
            .collect();

        let consumed = offset + keys.len();
        let cursor = if consumed >= matching.len() {
            0
        } else {
            consumed as u64
        };

        Ok(ScanPage { cursor, keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_set_get_delete() {
        let backend = MemoryBackend::new();
        backend.set("k", "v", None).unwrap();

        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        assert!(backend.exists("k").unwrap());

        backend.delete("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);

        // Deleting an absent key is a no-op
        backend.delete("k").unwrap();
    }

    #[test]
    fn test_expiration() {
        let backend = MemoryBackend::new();
        backend
            .set("k", "v", Some(Duration::from_millis(50)))
            .unwrap();

        assert!(backend.exists("k").unwrap());
        sleep(Duration::from_millis(80));
        assert!(!backend.exists("k").unwrap());
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn test_set_without_ttl_clears_expiration() {
        let backend = MemoryBackend::new();
        backend
            .set("k", "v1", Some(Duration::from_millis(50)))
            .unwrap();
        backend.set("k", "v2", None).unwrap();

        sleep(Duration::from_millis(80));
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(backend.remaining_ttl("k"), None);
    }

    #[test]
    fn test_expire_resets_ttl() {
        let backend = MemoryBackend::new();
        backend
            .set("k", "v", Some(Duration::from_millis(60)))
            .unwrap();

        sleep(Duration::from_millis(40));
        backend.expire("k", Duration::from_millis(200)).unwrap();

        let remaining = backend.remaining_ttl("k").unwrap();
        assert!(remaining > Duration::from_millis(100));

        // Missing keys are a no-op
        backend.expire("nope", Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn test_scan_pages_cover_namespace() {
        let backend = MemoryBackend::new();
        for i in 0..25 {
            backend.set(&format!("ns:{i:02}"), "v", None).unwrap();
        }
        backend.set("other:0", "v", None).unwrap();

        let mut cursor = 0;
        let mut seen = Vec::new();
        loop {
            let page = backend.scan_page("ns:", cursor, 10).unwrap();
            let is_last = page.is_last();
            cursor = page.cursor;
            seen.extend(page.keys);
            if is_last {
                break;
            }
        }

        assert_eq!(seen.len(), 25);
        assert!(seen.iter().all(|key| key.starts_with("ns:")));
    }

    #[test]
    fn test_scan_skips_expired() {
        let backend = MemoryBackend::new();
        backend
            .set("ns:a", "v", Some(Duration::from_millis(30)))
            .unwrap();
        backend.set("ns:b", "v", None).unwrap();

        sleep(Duration::from_millis(60));
        let page = backend.scan_page("ns:", 0, 100).unwrap();
        assert_eq!(page.keys, vec!["ns:b".to_string()]);
        assert!(page.is_last());
    }

    #[test]
    fn test_scan_empty_namespace() {
        let backend = MemoryBackend::new();
        let page = backend.scan_page("empty:", 0, 10).unwrap();
        assert!(page.keys.is_empty());
        assert!(page.is_last());
    }
}
