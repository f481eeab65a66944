//! Identifier types for swagger-gate.
//!
//! The only identifier the gateway mints itself is the OAuth correlation
//! identifier. It is a random v4 UUID, which makes it unguessable for the
//! lifetime of a login attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cache key prefix for pending OAuth correlation entries.
const CORRELATION_KEY_PREFIX: &str = "google_oauth_state:";

/// A single-use login correlation identifier.
///
/// Sent to the identity provider as the OAuth `state` parameter and echoed
/// back on the callback, where it must match a pending cache entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(uuid::Uuid);

impl CorrelationId {
    /// Generate a new random `CorrelationId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// The key under which this identifier is held in the correlation cache.
    #[must_use]
    pub fn cache_key(&self) -> String {
        cache_key_for(&self.0.to_string())
    }
}

/// Build the correlation cache key for a raw `state` value.
///
/// Callback `state` parameters are attacker-controlled, so lookups use the raw
/// string rather than requiring it to parse as a `CorrelationId` first.
#[must_use]
pub fn cache_key_for(state: &str) -> String {
    format!("{CORRELATION_KEY_PREFIX}{state}")
}

impl FromStr for CorrelationId {
    type Err = IdError;

    /// Parse a `CorrelationId` from a UUID string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({})", self.0)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0.to_string()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_roundtrip() {
        let id = CorrelationId::generate();
        let parsed = CorrelationId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn correlation_ids_are_unique() {
        assert_ne!(CorrelationId::generate(), CorrelationId::generate());
    }

    #[test]
    fn correlation_id_rejects_garbage() {
        let result = CorrelationId::from_str("not-a-uuid");
        assert_eq!(result, Err(IdError::InvalidUuid));
    }

    #[test]
    fn cache_key_is_prefixed() {
        let id = CorrelationId::generate();
        assert_eq!(id.cache_key(), format!("google_oauth_state:{id}"));
        assert_eq!(cache_key_for(&id.to_string()), id.cache_key());
    }

    #[test]
    fn correlation_id_serde_json() {
        let id = CorrelationId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: CorrelationId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
