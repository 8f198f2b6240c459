//! Durable flag storage.
//!
//! A key-value map with get/set/remove-by-prefix semantics, used for
//! feature flags and shown-hint bookkeeping. Values are stored as JSON.

use crate::error::{Result, StoreError};
use serde_json::Value;
use sqlx::{Pool, Sqlite};

/// Prefix for per-hint "already shown" markers.
pub const HINT_SHOWN_PREFIX: &str = "hint_shown_";
/// Prefix for per-hint permanent dismissals.
pub const HINT_DISMISSED_PERM_PREFIX: &str = "hint_dismissed_perm_";
/// Flag disabling the hint system entirely.
pub const HINTS_SYSTEM_DISABLED_KEY: &str = "hints_system_disabled";
/// List of release versions whose "what's new" page was already shown.
pub const WHATS_NEW_SHOWN_VERSIONS_KEY: &str = "whats_new_shown_versions";

/// Set a flag value.
pub async fn set_flag(pool: &Pool<Sqlite>, key: &str, value: &Value) -> Result<()> {
    let value_str = serde_json::to_string(value)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    sqlx::query(
        r"
        INSERT INTO flags (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a flag value.
pub async fn get_flag(pool: &Pool<Sqlite>, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as(
        r"
        SELECT value
        FROM flags
        WHERE key = ?
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((value_str,)) => {
            let value: Value = serde_json::from_str(&value_str)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Remove every flag whose key starts with `prefix`.
///
/// Returns the number of removed flags.
pub async fn remove_by_prefix(pool: &Pool<Sqlite>, prefix: &str) -> Result<u64> {
    // ESCAPE so user-visible prefixes containing _ or % stay literal
    let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");

    let result = sqlx::query("DELETE FROM flags WHERE key LIKE ? ESCAPE '\\'")
        .bind(format!("{escaped}%"))
        .execute(pool)
        .await?;

    let removed = result.rows_affected();
    tracing::debug!(prefix, removed, "removed flags by prefix");

    Ok(removed)
}

/// Whether the hint with `hint_id` was already shown.
pub async fn is_hint_shown(pool: &Pool<Sqlite>, hint_id: &str) -> Result<bool> {
    let value = get_flag(pool, &format!("{HINT_SHOWN_PREFIX}{hint_id}")).await?;
    Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
}

/// Mark the hint with `hint_id` as shown.
pub async fn mark_hint_shown(pool: &Pool<Sqlite>, hint_id: &str) -> Result<()> {
    set_flag(pool, &format!("{HINT_SHOWN_PREFIX}{hint_id}"), &Value::Bool(true)).await
}

/// Reset all per-hint dismissal bookkeeping.
pub async fn reset_dismissed_hints(pool: &Pool<Sqlite>) -> Result<u64> {
    remove_by_prefix(pool, HINT_DISMISSED_PERM_PREFIX).await
}

/// Get the versions whose "what's new" page was already shown.
pub async fn whats_new_shown_versions(pool: &Pool<Sqlite>) -> Result<Vec<String>> {
    let value = get_flag(pool, WHATS_NEW_SHOWN_VERSIONS_KEY).await?;
    match value {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| StoreError::Serialization(e.to_string())),
        None => Ok(Vec::new()),
    }
}

/// Mark a version's "what's new" page as shown.
pub async fn mark_whats_new_shown(pool: &Pool<Sqlite>, version: &str) -> Result<()> {
    let mut versions = whats_new_shown_versions(pool).await?;
    if !versions.iter().any(|v| v == version) {
        versions.push(version.to_string());
        let value = serde_json::to_value(&versions)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        set_flag(pool, WHATS_NEW_SHOWN_VERSIONS_KEY, &value).await?;
    }
    Ok(())
}
