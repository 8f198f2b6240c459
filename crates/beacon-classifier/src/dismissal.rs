//! The dismissal store seam and TTL evaluation.
//!
//! A dismissal suppresses a flagged warning for 30 days from the moment
//! the user dismissed it. Only the timestamp is persisted; validity is
//! evaluated here at classification time, never pre-computed.

use crate::error::Result;
use async_trait::async_trait;
use beacon_store::{dismissals, MemoryStore, Store};
use chrono::{DateTime, Duration, Utc};

/// Days a dismissal stays valid.
pub const DISMISSAL_TTL_DAYS: i64 = 30;

/// Storage the classifier requires for dismissal timestamps.
///
/// Implemented by the SQLite-backed [`Store`] and the session-scoped
/// [`MemoryStore`]; tests substitute either.
#[async_trait]
pub trait DismissalStore: Send + Sync {
    /// Get the dismissal timestamp for `key`, if any.
    async fn dismissed_at(&self, key: &str) -> Result<Option<DateTime<Utc>>>;

    /// Record a dismissal for `key` at the given time.
    async fn set_dismissed(&self, key: &str, at: DateTime<Utc>) -> Result<()>;

    /// Remove the dismissal for `key`.
    async fn clear(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl DismissalStore for Store {
    async fn dismissed_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(dismissals::dismissed_at(self.pool(), key).await?)
    }

    async fn set_dismissed(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        Ok(dismissals::set_dismissed(self.pool(), key, at).await?)
    }

    async fn clear(&self, key: &str) -> Result<()> {
        Ok(dismissals::clear(self.pool(), key).await?)
    }
}

#[async_trait]
impl DismissalStore for MemoryStore {
    async fn dismissed_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(MemoryStore::dismissed_at(self, key))
    }

    async fn set_dismissed(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        MemoryStore::set_dismissed(self, key, at);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        MemoryStore::clear(self, key);
        Ok(())
    }
}

/// Whether a dismissal made at `dismissed_at` is still valid at `now`.
#[must_use]
pub fn is_still_valid(dismissed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(dismissed_at) < Duration::days(DISMISSAL_TTL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_boundary() {
        let now = Utc::now();

        assert!(is_still_valid(now - Duration::days(29), now));
        assert!(!is_still_valid(now - Duration::days(31), now));
        assert!(is_still_valid(now, now));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let now = Utc::now();

        DismissalStore::set_dismissed(&store, "li_acme", now)
            .await
            .expect("set dismissal");

        let at = DismissalStore::dismissed_at(&store, "li_acme")
            .await
            .expect("read dismissal");
        assert_eq!(at, Some(now));

        DismissalStore::clear(&store, "li_acme")
            .await
            .expect("clear dismissal");
        let at = DismissalStore::dismissed_at(&store, "li_acme")
            .await
            .expect("read cleared dismissal");
        assert!(at.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let store = Store::new(":memory:").await.expect("open store");
        store.run_migrations().await.expect("run migrations");

        let now = Utc::now();
        DismissalStore::set_dismissed(&store, "ws_example.com", now)
            .await
            .expect("set dismissal");

        let at = DismissalStore::dismissed_at(&store, "ws_example.com")
            .await
            .expect("read dismissal")
            .expect("dismissal present");
        assert_eq!(at.timestamp(), now.timestamp());
    }
}
