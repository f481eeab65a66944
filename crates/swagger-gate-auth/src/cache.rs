//! Correlation cache for in-flight logins.
//!
//! Each login redirect stores its `state` value here and the matching
//! callback takes it back out. Entries live for a few minutes at most and are
//! never persisted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A pending value and the instant it stops being retrievable.
#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// A process-local, time-expiring key/value store with take-once reads.
///
/// `take` removes the entry it returns, so a callback cannot be replayed.
/// Expired, consumed and never-stored keys all read as `None`.
#[derive(Debug, Default)]
pub struct CorrelationCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl CorrelationCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` for `ttl`.
    ///
    /// An existing entry for the same key is overwritten. Expired entries are
    /// dropped on every write.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let now = Instant::now();
        // An unrepresentable deadline is treated as already expired.
        let expires_at = now.checked_add(ttl).unwrap_or(now);

        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.into(),
            Entry {
                value: value.into(),
                expires_at,
            },
        );
    }

    /// Remove and return the value under `key` if it has not expired.
    #[must_use]
    pub fn take(&self, key: &str) -> Option<String> {
        let entry = self.entries.lock().remove(key)?;
        entry.is_live(Instant::now()).then_some(entry.value)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
