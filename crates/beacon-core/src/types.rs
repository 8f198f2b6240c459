//! Shared types used across the Beacon workspace.
//!
//! This module defines the reason-code and field-key enumerations and the
//! tagged classification result that the classifier produces and the scanner
//! consumes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason codes explaining why an entity is flagged.
///
/// This is a closed enumeration; the short codes are the wire/database
/// representation used by the bundled dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    /// Headquarters located in the flagged region
    #[serde(rename = "h")]
    HeadquartersInRegion,
    /// Founded by people located in the flagged region
    #[serde(rename = "f")]
    FounderInRegion,
    /// Backed by investors located in the flagged region
    #[serde(rename = "i")]
    InvestorInRegion,
    /// Served from the flagged regional URL suffix
    #[serde(rename = "u")]
    RegionUrlSuffix,
    /// Listed on the boycott list
    #[serde(rename = "b")]
    BoycottList,
}

impl Reason {
    /// Get the short wire code for this reason.
    #[must_use]
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::HeadquartersInRegion => "h",
            Self::FounderInRegion => "f",
            Self::InvestorInRegion => "i",
            Self::RegionUrlSuffix => "u",
            Self::BoycottList => "b",
        }
    }

    /// Get a human-readable display name for the reason.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HeadquartersInRegion => "Headquarters in region",
            Self::FounderInRegion => "Founder in region",
            Self::InvestorInRegion => "Investor in region",
            Self::RegionUrlSuffix => "Regional URL suffix",
            Self::BoycottList => "Boycott list",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Selector field keys identifying which dataset field a selector is
/// compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    /// Website domain
    #[serde(rename = "ws")]
    Website,
    /// LinkedIn company/showcase slug
    #[serde(rename = "li")]
    LinkedIn,
    /// Facebook page name
    #[serde(rename = "fb")]
    Facebook,
    /// Twitter/X handle
    #[serde(rename = "tw")]
    Twitter,
    /// Instagram handle
    #[serde(rename = "ig")]
    Instagram,
    /// GitHub organization or user
    #[serde(rename = "gh")]
    GitHub,
    /// YouTube profile handle
    #[serde(rename = "ytp")]
    YoutubeProfile,
    /// YouTube channel id
    #[serde(rename = "ytc")]
    YoutubeChannel,
    /// TikTok handle
    #[serde(rename = "tt")]
    TikTok,
    /// Threads handle
    #[serde(rename = "th")]
    Threads,
    /// Reserved regional domain suffix
    #[serde(rename = "il")]
    RegionalSuffix,
}

impl FieldKey {
    /// Get the short code used in dismissal keys and the dataset schema.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "ws",
            Self::LinkedIn => "li",
            Self::Facebook => "fb",
            Self::Twitter => "tw",
            Self::Instagram => "ig",
            Self::GitHub => "gh",
            Self::YoutubeProfile => "ytp",
            Self::YoutubeChannel => "ytc",
            Self::TikTok => "tt",
            Self::Threads => "th",
            Self::RegionalSuffix => "il",
        }
    }

    /// Whether selectors compared against this field are case-insensitive.
    ///
    /// LinkedIn, Twitter and YouTube identifiers are case-insensitive on
    /// their platforms; the rest are compared exactly.
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Self::LinkedIn | Self::Twitter | Self::YoutubeProfile | Self::YoutubeChannel
        )
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which dataset field a classification matched, and with what selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMatch {
    /// The extracted platform-specific identifier
    pub selector: String,
    /// The dataset field the selector was compared against
    pub key: FieldKey,
}

impl SelectorMatch {
    /// Create a new selector match.
    pub fn new(key: FieldKey, selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            key,
        }
    }

    /// The dismissal store key for this match: `<key>_<selector>`.
    #[must_use]
    pub fn dismissal_key(&self) -> String {
        format!("{}_{}", self.key.as_str(), self.selector)
    }
}

/// A suggested alternative entity for a flagged one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Alternative entity name
    #[serde(rename = "n")]
    pub name: String,
    /// Alternative entity website
    #[serde(rename = "ws")]
    pub website: String,
}

/// The result of classifying a URL.
///
/// A tagged union replaces the loosely-optional result object: a `Hint` is
/// informational and never dismissible, a `Flagged` result carries the
/// matched record's reasons, and `Safe` is the absence of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Informational, non-dismissible classification.
    Hint {
        /// Display name of the matched entity
        name: String,
        /// Hint body text
        hint_text: String,
        /// Link presented with the hint
        hint_url: String,
        /// The field/selector pair that produced this result
        matched: SelectorMatch,
    },
    /// The URL matched a flagged entity.
    Flagged {
        /// Display name of the matched entity
        name: String,
        /// Reason codes from the matched record; empty only for dismissal
        /// short-circuit results that never consulted the dataset
        reasons: Vec<Reason>,
        /// Suggested alternative entities
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        alternatives: Vec<Alternative>,
        /// Public stock symbol, when the entity is listed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stock_symbol: Option<String>,
        /// Free-form curator comment
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
        /// Whether a still-valid user dismissal suppresses the warning
        dismissed: bool,
        /// The field/selector pair that produced this result
        matched: SelectorMatch,
    },
    /// No match; the URL is not classified.
    Safe,
}

impl Classification {
    /// Whether this is the `Safe` variant.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// Whether this is a `Hint`.
    #[must_use]
    pub fn is_hint(&self) -> bool {
        matches!(self, Self::Hint { .. })
    }

    /// Whether this is a `Flagged` result (dismissed or not).
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::Flagged { .. })
    }

    /// The selector match, when one exists (`Safe` has none).
    #[must_use]
    pub fn matched(&self) -> Option<&SelectorMatch> {
        match self {
            Self::Hint { matched, .. } | Self::Flagged { matched, .. } => Some(matched),
            Self::Safe => None,
        }
    }
}
