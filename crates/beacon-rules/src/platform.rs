//! Supported platforms and the platform-to-field-key mapping.

use crate::error::{Result, RuleError};
use beacon_core::FieldKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platforms the classification engine has URL rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// linkedin.com company and showcase pages
    LinkedIn,
    /// facebook.com pages
    Facebook,
    /// twitter.com / x.com / t.co profiles
    Twitter,
    /// instagram.com profiles
    Instagram,
    /// github.com organizations and users
    GitHub,
    /// youtube.com profiles and channels
    Youtube,
    /// tiktok.com profiles
    TikTok,
    /// threads.com profiles
    Threads,
}

impl Platform {
    /// Whether identifiers on this platform are case-insensitive.
    ///
    /// YouTube, Twitter and LinkedIn treat their identifiers as
    /// case-insensitive; rules for these platforms match and compare
    /// without case.
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, Self::Youtube | Self::Twitter | Self::LinkedIn)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LinkedIn => "linkedin",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::GitHub => "github",
            Self::Youtube => "youtube",
            Self::TikTok => "tiktok",
            Self::Threads => "threads",
        };
        write!(f, "{name}")
    }
}

/// Map a platform to the dataset field key its selectors are compared
/// against.
///
/// The mapping is one-to-one except for YouTube, where the URL path decides
/// between the channel field (`/channel/` URLs) and the profile field
/// (`/@` URLs). A YouTube URL matching neither shape defaults to the
/// profile field; this is a documented default pending product
/// clarification, not a silent assumption. Calling this for YouTube without
/// a URL fails fast, since guessing would produce incorrect
/// classifications.
pub fn field_key_for(platform: Platform, url: Option<&str>) -> Result<FieldKey> {
    match platform {
        Platform::LinkedIn => Ok(FieldKey::LinkedIn),
        Platform::Facebook => Ok(FieldKey::Facebook),
        Platform::Twitter => Ok(FieldKey::Twitter),
        Platform::Instagram => Ok(FieldKey::Instagram),
        Platform::GitHub => Ok(FieldKey::GitHub),
        Platform::TikTok => Ok(FieldKey::TikTok),
        Platform::Threads => Ok(FieldKey::Threads),
        Platform::Youtube => {
            let url = url.ok_or_else(|| RuleError::AmbiguousFieldKey {
                platform: platform.to_string(),
            })?;
            if url.contains("/channel/") {
                Ok(FieldKey::YoutubeChannel)
            } else {
                Ok(FieldKey::YoutubeProfile)
            }
        }
    }
}
