//! In-memory session store.
//!
//! Hosts without disk access (and tests) back the dismissal map with this
//! store. Contents live for the session only; `clear_all` mirrors the host
//! clearing its session storage on startup.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Session-scoped in-memory dismissal store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dismissals: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dismissal for `key` at the given time.
    pub fn set_dismissed(&self, key: &str, at: DateTime<Utc>) {
        let mut map = self
            .dismissals
            .write()
            .expect("acquire write lock on dismissals");
        map.insert(key.to_string(), at);
    }

    /// Get the dismissal timestamp for `key`, if any.
    #[must_use]
    pub fn dismissed_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let map = self
            .dismissals
            .read()
            .expect("acquire read lock on dismissals");
        map.get(key).copied()
    }

    /// Remove the dismissal for `key`. Returns whether one was present.
    pub fn clear(&self, key: &str) -> bool {
        let mut map = self
            .dismissals
            .write()
            .expect("acquire write lock on dismissals");
        map.remove(key).is_some()
    }

    /// Drop all session state.
    pub fn clear_all(&self) {
        let mut map = self
            .dismissals
            .write()
            .expect("acquire write lock on dismissals");
        map.clear();
    }

    /// Number of recorded dismissals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dismissals
            .read()
            .expect("acquire read lock on dismissals")
            .len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
