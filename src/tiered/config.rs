//! Configuration for the tiered cache

use crate::codec::{CacheValue, KeyType, ValueType};
use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Construction-time configuration for a [`TieredCache`](crate::TieredCache)
///
/// Configuration errors are raised when the cache is built, never
/// deferred to operation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieredConfig {
    /// Namespace prefix prepended to every backend key as `name:key`,
    /// isolating logical caches sharing one backend. Empty means keys go
    /// to the backend unprefixed.
    pub name: String,

    /// Fast-tier capacity. 0 makes the fast tier always miss
    /// (pass-through to the backend on every read).
    pub local_max: usize,

    /// Backend expiration applied on every write; `None` means keys
    /// never expire.
    pub expire: Option<Duration>,

    /// Declared key type; keys are coerced to it at every API boundary
    pub key_type: KeyType,

    /// Declared value type, selecting the backend codec
    pub value_type: ValueType,

    /// Value materialized (written through and returned) when a read
    /// misses both tiers; `None` means misses return nothing.
    pub default_value: Option<CacheValue>,

    /// Whether a backend read-through also resets the key's remaining
    /// time-to-live (only meaningful with `expire` set)
    pub refresh_expire_on_get: bool,
}

impl Default for TieredConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            local_max: 100,
            expire: None,
            key_type: KeyType::Str,
            value_type: ValueType::Str,
            default_value: None,
            refresh_expire_on_get: false,
        }
    }
}

impl TieredConfig {
    /// Create a new builder for tiered cache configuration
    pub fn builder() -> TieredConfigBuilder {
        TieredConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(expire) = self.expire {
            if expire.is_zero() {
                return Err(CacheError::Config(
                    "expire duration must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Derive the raw backend key for a coerced cache key
    pub(crate) fn backend_key(&self, key: &crate::codec::Key) -> String {
        if self.name.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.name, key)
        }
    }

    /// Scan prefix covering this cache's backend namespace
    pub(crate) fn scan_prefix(&self) -> String {
        if self.name.is_empty() {
            String::new()
        } else {
            format!("{}:", self.name)
        }
    }
}

/// Builder for tiered cache configuration
#[derive(Debug, Default)]
pub struct TieredConfigBuilder {
    name: Option<String>,
    local_max: Option<usize>,
    expire: Option<Duration>,
    key_type: Option<KeyType>,
    value_type: Option<ValueType>,
    default_value: Option<CacheValue>,
    refresh_expire_on_get: Option<bool>,
}

impl TieredConfigBuilder {
    /// Set the namespace prefix
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the fast-tier capacity
    pub fn local_max(mut self, max: usize) -> Self {
        self.local_max = Some(max);
        self
    }

    /// Set the backend expiration duration
    pub fn expire(mut self, expire: Duration) -> Self {
        self.expire = Some(expire);
        self
    }

    /// Set the declared key type
    pub fn key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }

    /// Set the declared value type
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Set the default value materialized on misses
    pub fn default_value(mut self, value: CacheValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Refresh backend expiration on read-through hits
    pub fn refresh_expire_on_get(mut self, refresh: bool) -> Self {
        self.refresh_expire_on_get = Some(refresh);
        self
    }

    /// Build the configuration
    pub fn build(self) -> TieredConfig {
        let defaults = TieredConfig::default();

        TieredConfig {
            name: self.name.unwrap_or(defaults.name),
            local_max: self.local_max.unwrap_or(defaults.local_max),
            expire: self.expire.or(defaults.expire),
            key_type: self.key_type.unwrap_or(defaults.key_type),
            value_type: self.value_type.unwrap_or(defaults.value_type),
            default_value: self.default_value.or(defaults.default_value),
            refresh_expire_on_get: self
                .refresh_expire_on_get
                .unwrap_or(defaults.refresh_expire_on_get),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Key;

    #[test]
    fn test_default_config() {
        let config = TieredConfig::default();
        assert_eq!(config.local_max, 100);
        assert_eq!(config.expire, None);
        assert_eq!(config.key_type, KeyType::Str);
        assert_eq!(config.value_type, ValueType::Str);
        assert!(!config.refresh_expire_on_get);
    }

    #[test]
    fn test_config_builder() {
        let config = TieredConfig::builder()
            .name("sessions")
            .local_max(500)
            .expire(Duration::from_secs(60))
            .key_type(KeyType::Int)
            .value_type(ValueType::Json)
            .refresh_expire_on_get(true)
            .build();

        assert_eq!(config.name, "sessions");
        assert_eq!(config.local_max, 500);
        assert_eq!(config.expire, Some(Duration::from_secs(60)));
        assert_eq!(config.key_type, KeyType::Int);
        assert_eq!(config.value_type, ValueType::Json);
        assert!(config.refresh_expire_on_get);
    }

    #[test]
    fn test_validation_rejects_zero_expire() {
        let config = TieredConfig {
            expire: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::Config(_))
        ));

        assert!(TieredConfig::default().validate().is_ok());
    }

    #[test]
    fn test_backend_key_derivation() {
        let named = TieredConfig::builder().name("users").build();
        assert_eq!(named.backend_key(&Key::from(42i64)), "users:42");
        assert_eq!(named.scan_prefix(), "users:");

        // Empty name means no prefix
        let unnamed = TieredConfig::default();
        assert_eq!(unnamed.backend_key(&Key::from("raw")), "raw");
        assert_eq!(unnamed.scan_prefix(), "");
    }
}
