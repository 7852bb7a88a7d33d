//! Key coercion and value marshaling
//!
//! Keys are coerced to the cache's declared key type at every API
//! boundary. Value encode/decode applies only at the backend boundary:
//! the fast tier stores whatever shape the caller assigned, while values
//! read back from the backend pass through [`Codec::decode`]. The same
//! logical key can therefore yield a different runtime shape depending on
//! which tier served it - a deliberate characteristic of the design.

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic value shape held by the fast tier and returned to callers
pub type CacheValue = serde_json::Value;

/// Declared key type of a tiered cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    /// String keys (default)
    #[default]
    Str,
    /// Integer keys
    Int,
}

/// Declared value type of a tiered cache, selecting the codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// String passthrough; decode is identity (default)
    #[default]
    Str,
    /// Stored via generic stringification; decode parses an integer
    Int,
    /// JSON text round-trip
    Json,
    /// Caller-supplied encode/decode pair; both are required
    Custom,
}

/// A cache key, either string- or integer-shaped
///
/// `Display` renders the raw form sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl Key {
    /// Coerce this key to the declared key type
    ///
    /// String keys parse to integers (and vice versa render); failure is a
    /// [`CacheError::KeyCoercion`].
    pub fn coerce(self, target: KeyType) -> Result<Key> {
        match (self, target) {
            (Key::Str(s), KeyType::Int) => match s.parse::<i64>() {
                Ok(i) => Ok(Key::Int(i)),
                Err(_) => Err(CacheError::KeyCoercion {
                    key: s,
                    target: "int",
                }),
            },
            (Key::Int(i), KeyType::Str) => Ok(Key::Str(i.to_string())),
            (key, _) => Ok(key),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s}"),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

/// Caller-supplied value encoder for [`ValueType::Custom`]
pub type EncodeFn = Box<dyn Fn(&CacheValue) -> Result<String> + Send + Sync>;

/// Caller-supplied value decoder for [`ValueType::Custom`]
pub type DecodeFn = Box<dyn Fn(&str) -> Result<CacheValue> + Send + Sync>;

/// Value marshaling applied at the backend boundary
pub struct Codec {
    value_type: ValueType,
    encode_fn: Option<EncodeFn>,
    decode_fn: Option<DecodeFn>,
}

impl Codec {
    /// Build the codec for a non-custom value type
    ///
    /// Requesting [`ValueType::Custom`] here is a configuration error;
    /// custom codecs carry their functions and come from
    /// [`Codec::custom`].
    pub fn for_value_type(value_type: ValueType) -> Result<Self> {
        if value_type == ValueType::Custom {
            return Err(CacheError::Config(
                "custom value_type requires both an encoder and a decoder".to_string(),
            ));
        }
        Ok(Self {
            value_type,
            encode_fn: None,
            decode_fn: None,
        })
    }

    /// Build a custom codec from an encode/decode pair
    pub fn custom(encode: EncodeFn, decode: DecodeFn) -> Self {
        Self {
            value_type: ValueType::Custom,
            encode_fn: Some(encode),
            decode_fn: Some(decode),
        }
    }

    /// The value type this codec serves
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Encode a native value into the raw string stored by the backend
    pub fn encode(&self, value: &CacheValue) -> Result<String> {
        match self.value_type {
            // Generic stringification: string values pass through
            // verbatim, anything else renders compactly.
            ValueType::Str | ValueType::Int => Ok(stringify(value)),
            ValueType::Json => Ok(serde_json::to_string(value)?),
            ValueType::Custom => match &self.encode_fn {
                Some(encode) => encode(value),
                None => Err(CacheError::Config(
                    "custom codec is missing its encoder".to_string(),
                )),
            },
        }
    }

    /// Decode a raw backend string into the native value shape
    pub fn decode(&self, raw: &str) -> Result<CacheValue> {
        match self.value_type {
            ValueType::Str => Ok(CacheValue::String(raw.to_string())),
            ValueType::Int => raw
                .parse::<i64>()
                .map(CacheValue::from)
                .map_err(|_| CacheError::Codec(format!("not an integer: {raw:?}"))),
            ValueType::Json => Ok(serde_json::from_str(raw)?),
            ValueType::Custom => match &self.decode_fn {
                Some(decode) => decode(raw),
                None => Err(CacheError::Config(
                    "custom codec is missing its decoder".to_string(),
                )),
            },
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("value_type", &self.value_type)
            .field("encode_fn", &self.encode_fn.as_ref().map(|_| "fn"))
            .field("decode_fn", &self.decode_fn.as_ref().map(|_| "fn"))
            .finish()
    }
}

fn stringify(value: &CacheValue) -> String {
    match value {
        CacheValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_coercion() {
        let key = Key::from("42").coerce(KeyType::Int).unwrap();
        assert_eq!(key, Key::Int(42));

        let key = Key::from(7i64).coerce(KeyType::Str).unwrap();
        assert_eq!(key, Key::Str("7".to_string()));

        let key = Key::from("already").coerce(KeyType::Str).unwrap();
        assert_eq!(key, Key::Str("already".to_string()));
    }

    #[test]
    fn test_key_coercion_failure() {
        let err = Key::from("not-a-number").coerce(KeyType::Int).unwrap_err();
        assert!(matches!(err, CacheError::KeyCoercion { .. }));
    }

    #[test]
    fn test_key_display_is_raw_form() {
        assert_eq!(Key::from("user").to_string(), "user");
        assert_eq!(Key::from(42i64).to_string(), "42");
    }

    #[test]
    fn test_str_codec() {
        let codec = Codec::for_value_type(ValueType::Str).unwrap();

        assert_eq!(codec.encode(&json!("hello")).unwrap(), "hello");
        // Non-string shapes render compactly rather than failing
        assert_eq!(codec.encode(&json!(5)).unwrap(), "5");

        assert_eq!(codec.decode("hello").unwrap(), json!("hello"));
    }

    #[test]
    fn test_int_codec_round_trip() {
        let codec = Codec::for_value_type(ValueType::Int).unwrap();

        let raw = codec.encode(&json!(1234)).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), json!(1234));

        let err = codec.decode("oops").unwrap_err();
        assert!(matches!(err, CacheError::Codec(_)));
    }

    #[test]
    fn test_json_codec_round_trip() {
        let codec = Codec::for_value_type(ValueType::Json).unwrap();
        let value = json!({"name": "alice", "tags": ["a", "b"], "n": 3});

        let raw = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), value);
    }

    #[test]
    fn test_custom_without_functions_is_config_error() {
        let err = Codec::for_value_type(ValueType::Custom).unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[test]
    fn test_custom_codec() {
        let codec = Codec::custom(
            Box::new(|value| Ok(format!("v1|{}", value))),
            Box::new(|raw| {
                let body = raw.strip_prefix("v1|").unwrap_or(raw);
                Ok(serde_json::from_str(body)?)
            }),
        );

        let raw = codec.encode(&json!([1, 2])).unwrap();
        assert_eq!(raw, "v1|[1,2]");
        assert_eq!(codec.decode(&raw).unwrap(), json!([1, 2]));
    }
}
