//! Error types for cache operations
//!
//! This module defines the error type shared by the bounded maps and the
//! tiered cache, with a crate-wide `Result` alias.

use thiserror::Error;

/// Main error type for cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration error - rejected at construction time, never deferred
    #[error("Configuration error: {0}")]
    Config(String),

    /// A supplied key could not be converted to the declared key type
    #[error("Key coercion error: cannot convert {key:?} to {target}")]
    KeyCoercion { key: String, target: &'static str },

    /// Key absent from a bounded map lookup
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Failure surfaced by the backend; propagated unchanged, never retried
    #[error("Backend error: {0}")]
    Backend(String),

    /// Value encode/decode failure at the backend boundary
    #[error("Codec error: {0}")]
    Codec(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Codec(e.to_string())
    }
}
