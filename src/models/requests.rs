//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Request body for the PUT operation (PUT /put)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value; `null` when omitted
/// - `ttl`: Time to live as a duration string such as `"500ms"`, `"30s"` or `"1h 15m"`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    #[serde(default)]
    pub value: Value,
    /// Duration string; a missing TTL fails duration parsing, not decoding
    #[serde(default)]
    pub ttl: String,
}

impl PutRequest {
    /// Decodes a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|err| CacheError::MalformedRequest(err.to_string()))
    }

    /// Validates the request data
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(CacheError::MalformedRequest(
                "Key cannot be empty".to_string(),
            ));
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::MalformedRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        Ok(())
    }

    /// Parses the TTL string.
    pub fn parse_ttl(&self) -> Result<Duration> {
        humantime::parse_duration(self.ttl.trim())
            .map_err(|err| CacheError::InvalidTtl(format!("\"{}\": {}", self.ttl, err)))
    }
}
