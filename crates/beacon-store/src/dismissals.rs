//! Dismissal timestamp storage.
//!
//! Keys have the form `<field_key>_<selector>` (e.g. `li_acme`). Only the
//! dismiss timestamp is stored; whether a dismissal is still valid is
//! decided by the classifier against its TTL at classification time.

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

/// Record a dismissal for `key` at the given time, replacing any earlier
/// dismissal of the same key.
pub async fn set_dismissed(pool: &Pool<Sqlite>, key: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO dismissals (key, dismissed_at)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET
            dismissed_at = excluded.dismissed_at
        ",
    )
    .bind(key)
    .bind(at.to_rfc3339())
    .execute(pool)
    .await?;

    tracing::debug!(key, "recorded dismissal");

    Ok(())
}

/// Get the dismissal timestamp for `key`, if one was ever recorded.
pub async fn dismissed_at(pool: &Pool<Sqlite>, key: &str) -> Result<Option<DateTime<Utc>>> {
    let row: Option<(String,)> = sqlx::query_as(
        r"
        SELECT dismissed_at
        FROM dismissals
        WHERE key = ?
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((raw,)) => {
            let parsed = DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| StoreError::Decode(format!("bad dismissal timestamp: {e}")))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

/// Remove the dismissal for `key`.
pub async fn clear(pool: &Pool<Sqlite>, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM dismissals WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

/// Garbage-collect dismissals older than `ttl`.
///
/// Optional maintenance; never required for correctness, since expiry is
/// always evaluated at classification time. Returns the number of removed
/// rows.
pub async fn prune_expired(pool: &Pool<Sqlite>, ttl: chrono::Duration) -> Result<u64> {
    let cutoff = Utc::now() - ttl;

    let result = sqlx::query("DELETE FROM dismissals WHERE dismissed_at < ?")
        .bind(cutoff.to_rfc3339())
        .execute(pool)
        .await?;

    let removed = result.rows_affected();
    if removed > 0 {
        tracing::info!(removed, "pruned expired dismissals");
    }

    Ok(removed)
}
