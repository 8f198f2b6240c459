//! Dataset record schema.
//!
//! Field names follow the bundled JSON file format: short keys for the
//! per-platform selector fields, `n`/`r`/`c`/`s` for name, reasons,
//! comment and stock symbol.

use crate::error::{DatasetError, Result};
use beacon_core::{Alternative, FieldKey, Reason};
use serde::{Deserialize, Serialize};

/// A single curated entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Unique record id
    pub id: String,

    /// Display name
    #[serde(rename = "n")]
    pub name: String,

    /// Reason codes for flagging this entity
    #[serde(rename = "r")]
    pub reasons: Vec<Reason>,

    /// Website domain
    #[serde(rename = "ws", default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// LinkedIn company/showcase slug
    #[serde(rename = "li", default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,

    /// Facebook page name
    #[serde(rename = "fb", default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,

    /// Twitter/X handle
    #[serde(rename = "tw", default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,

    /// Instagram handle
    #[serde(rename = "ig", default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,

    /// GitHub organization or user
    #[serde(rename = "gh", default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,

    /// YouTube profile handle
    #[serde(rename = "ytp", default, skip_serializing_if = "Option::is_none")]
    pub youtube_profile: Option<String>,

    /// YouTube channel id
    #[serde(rename = "ytc", default, skip_serializing_if = "Option::is_none")]
    pub youtube_channel: Option<String>,

    /// TikTok handle
    #[serde(rename = "tt", default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,

    /// Threads handle
    #[serde(rename = "th", default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<String>,

    /// Free-form curator comment
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Public stock symbol
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub stock_symbol: Option<String>,

    /// Suggested alternative entities
    #[serde(rename = "alt", default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<Alternative>>,

    /// Whether this record is an informational hint, not a flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<bool>,

    /// Hint body text
    #[serde(rename = "hintText", default, skip_serializing_if = "Option::is_none")]
    pub hint_text: Option<String>,

    /// Link presented with the hint
    #[serde(rename = "hintUrl", default, skip_serializing_if = "Option::is_none")]
    pub hint_url: Option<String>,
}

impl DatasetRecord {
    /// The selector field value for the given key.
    ///
    /// `RegionalSuffix` has no dataset field; regional-suffix results are
    /// produced by the classifier without a dataset lookup.
    #[must_use]
    pub fn field(&self, key: FieldKey) -> Option<&str> {
        match key {
            FieldKey::Website => self.website.as_deref(),
            FieldKey::LinkedIn => self.linkedin.as_deref(),
            FieldKey::Facebook => self.facebook.as_deref(),
            FieldKey::Twitter => self.twitter.as_deref(),
            FieldKey::Instagram => self.instagram.as_deref(),
            FieldKey::GitHub => self.github.as_deref(),
            FieldKey::YoutubeProfile => self.youtube_profile.as_deref(),
            FieldKey::YoutubeChannel => self.youtube_channel.as_deref(),
            FieldKey::TikTok => self.tiktok.as_deref(),
            FieldKey::Threads => self.threads.as_deref(),
            FieldKey::RegionalSuffix => None,
        }
    }

    /// Whether this record is an informational hint.
    #[must_use]
    pub fn is_hint(&self) -> bool {
        self.hint.unwrap_or(false)
    }

    /// Validate the record for completeness.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DatasetError::ValidationError {
                id: self.id.clone(),
                reason: "record id cannot be empty".to_string(),
            });
        }

        if self.name.trim().is_empty() {
            return Err(DatasetError::ValidationError {
                id: self.id.clone(),
                reason: "record name cannot be empty".to_string(),
            });
        }

        if self.is_hint() {
            if self.hint_text.as_deref().unwrap_or("").trim().is_empty() {
                return Err(DatasetError::ValidationError {
                    id: self.id.clone(),
                    reason: "hint record is missing hint text".to_string(),
                });
            }
            if self.hint_url.as_deref().unwrap_or("").trim().is_empty() {
                return Err(DatasetError::ValidationError {
                    id: self.id.clone(),
                    reason: "hint record is missing hint URL".to_string(),
                });
            }
        }

        Ok(())
    }
}
