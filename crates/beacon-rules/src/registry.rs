//! Platform URL rules and the in-memory rule registry.
//!
//! Each rule pairs a platform with a compiled URL pattern whose capture
//! groups hold the platform-specific selector. A pattern may carry several
//! alternative capture groups for equivalent URL shapes of one platform
//! (YouTube has four); extraction takes the first non-empty group.
//!
//! Path segments that look like identifiers but are platform routes
//! (`facebook.com/events`, `youtube.com/watch`, ...) are excluded by
//! per-rule reserved-segment tables consulted after capture.

use crate::error::{Result, RuleError};
use crate::platform::Platform;
use regex::RegexBuilder;
use tracing::debug;

/// A single platform URL rule.
#[derive(Debug, Clone)]
pub struct Rule {
    platform: Platform,
    pattern: regex::Regex,
    /// Captured values that are platform routes, not identifiers
    reserved_segments: &'static [&'static str],
    /// Hosts the rule must never match (e.g. `gist.github.com`)
    denied_hosts: &'static [&'static str],
    /// Path segments after the selector that disqualify the match
    /// (e.g. `/issues` under a GitHub owner)
    denied_path_segments: &'static [&'static str],
}

impl Rule {
    /// Compile a rule for the given platform.
    ///
    /// The pattern is compiled case-insensitively when the platform's
    /// identifiers are case-insensitive.
    pub fn new(platform: Platform, pattern: &str) -> Result<Self> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(platform.is_case_insensitive())
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            platform,
            pattern: compiled,
            reserved_segments: &[],
            denied_hosts: &[],
            denied_path_segments: &[],
        })
    }

    /// Set the reserved segment table.
    #[must_use]
    pub fn with_reserved_segments(mut self, segments: &'static [&'static str]) -> Self {
        self.reserved_segments = segments;
        self
    }

    /// Set the denied host table.
    #[must_use]
    pub fn with_denied_hosts(mut self, hosts: &'static [&'static str]) -> Self {
        self.denied_hosts = hosts;
        self
    }

    /// Set the denied path segment table.
    #[must_use]
    pub fn with_denied_path_segments(mut self, segments: &'static [&'static str]) -> Self {
        self.denied_path_segments = segments;
        self
    }

    /// The platform this rule identifies.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether this rule's pattern matches the (normalized) URL.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        if self.is_denied_host(url) {
            return false;
        }
        self.pattern.is_match(url)
    }

    /// Extract the platform selector from a matching URL.
    ///
    /// Takes the first non-empty capture group, then rejects reserved
    /// segments and matches with denied route segments in the remaining
    /// path. A matching rule with no extractable selector yields `None`;
    /// callers treat that as safe, never as an error.
    #[must_use]
    pub fn extract(&self, url: &str) -> Option<String> {
        if self.is_denied_host(url) {
            return None;
        }

        let captures = self.pattern.captures(url)?;
        let selector = (1..captures.len())
            .find_map(|i| captures.get(i).filter(|m| !m.as_str().is_empty()))?;

        if self
            .reserved_segments
            .iter()
            .any(|reserved| self.segment_eq(selector.as_str(), reserved))
        {
            debug!(
                platform = %self.platform,
                segment = selector.as_str(),
                "captured segment is a reserved platform route"
            );
            return None;
        }

        if !self.denied_path_segments.is_empty() {
            let tail = &url[selector.end()..];
            let tail_path = tail.split(['?', '#']).next().unwrap_or("");
            let denied = tail_path.split('/').any(|segment| {
                self.denied_path_segments
                    .iter()
                    .any(|d| self.segment_eq(segment, d))
            });
            if denied {
                debug!(
                    platform = %self.platform,
                    url,
                    "URL path contains a denied route segment"
                );
                return None;
            }
        }

        Some(selector.as_str().to_string())
    }

    fn is_denied_host(&self, url: &str) -> bool {
        if self.denied_hosts.is_empty() {
            return false;
        }
        let lowered = url.to_ascii_lowercase();
        self.denied_hosts.iter().any(|host| lowered.contains(host))
    }

    fn segment_eq(&self, a: &str, b: &str) -> bool {
        if self.platform.is_case_insensitive() {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

/// Immutable registry of platform URL rules, checked in declaration order.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Create a registry from an explicit rule list.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build the registry of supported platform rules.
    ///
    /// Rule order matters: the YouTube channel rule precedes the profile
    /// rule so `/channel/` URLs resolve to the channel field.
    #[must_use]
    pub fn builtin() -> Self {
        let rules = vec![
            Rule::new(
                Platform::LinkedIn,
                r"(?:https?://)?(?:www\.)?linkedin\.com/(?:company|showcase)/([^/?#]+)",
            )
            .expect("valid linkedin rule pattern"),
            Rule::new(
                Platform::Facebook,
                r"(?:^|[/.])facebook\.com/([^/?#]+)",
            )
            .expect("valid facebook rule pattern")
            .with_reserved_segments(&[
                "events",
                "groups",
                "marketplace",
                "watch",
                "gaming",
                "login",
            ]),
            Rule::new(
                Platform::Twitter,
                r"(?:^|[/.])(?:twitter\.com|x\.com|t\.co)/([^/?#]+)",
            )
            .expect("valid twitter rule pattern")
            .with_reserved_segments(&["search", "hashtag", "i", "intent", "settings"]),
            Rule::new(
                Platform::Instagram,
                r"(?:^|[/.])instagram\.com/([^/?#]+)",
            )
            .expect("valid instagram rule pattern")
            .with_reserved_segments(&[
                "explore", "reels", "p", "stories", "tv", "direct", "accounts",
            ]),
            // Captures the owner only: github.com/owner/repo -> owner
            Rule::new(Platform::GitHub, r"(?:^|[/.])github\.com/([^/?#]+)")
                .expect("valid github rule pattern")
                .with_reserved_segments(&["settings"])
                .with_denied_hosts(&["gist.github.com"])
                .with_denied_path_segments(&[
                    "issues", "pull", "releases", "actions", "security",
                ]),
            Rule::new(
                Platform::Youtube,
                r"(?:https?://)?(?:www\.)?youtube\.com/channel/([^/?#]+)",
            )
            .expect("valid youtube channel rule pattern"),
            // Four equivalent profile URL shapes; extraction takes the
            // first non-empty capture group.
            Rule::new(
                Platform::Youtube,
                r"(?:https?://)?(?:www\.)?youtube\.com/(?:user/([^/?#]+)|c/@?([^/?#]+)|@([^/?#]+)|([^/?#]+))",
            )
            .expect("valid youtube profile rule pattern")
            .with_reserved_segments(&[
                "about", "channel", "embed", "feed", "live", "playlist", "results", "shorts",
                "trending", "watch", "c", "user",
            ]),
            Rule::new(Platform::TikTok, r"(?:^|[/.])tiktok\.com/([^/?#]+)")
                .expect("valid tiktok rule pattern")
                .with_reserved_segments(&["discover", "foryou", "trending", "music", "upload"])
                .with_denied_path_segments(&["video"]),
            Rule::new(Platform::Threads, r"(?:^|[/.])threads\.com/([^/?#]+)")
                .expect("valid threads rule pattern")
                .with_reserved_segments(&["search", "explore", "activity", "settings"])
                .with_denied_path_segments(&["post"]),
        ];

        Self::new(rules)
    }

    /// Find the first rule whose pattern matches the normalized URL.
    #[must_use]
    pub fn find_match(&self, url: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(url))
    }

    /// Number of rules in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
