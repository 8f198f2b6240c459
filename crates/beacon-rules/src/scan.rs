//! Item scan rules: which pages get item-level scanning and how candidate
//! containers are recognized on them.

use crate::error::{Result, RuleError};
use regex::Regex;
use tracing::debug;

/// Default attribute the item URL is read from.
pub const DEFAULT_LINK_ATTRIBUTE: &str = "href";

/// Configuration for item-level scanning of a page family.
///
/// `url_pattern` decides which pages the rule applies to, `item_selector`
/// finds candidate container elements, and `link_selector` /
/// `link_attribute` locate the URL nested inside each container.
#[derive(Debug, Clone)]
pub struct ScanRule {
    /// Pages this rule applies to
    pub url_pattern: Regex,
    /// CSS selector for candidate container elements
    pub item_selector: String,
    /// CSS selector for the link element nested within a container
    pub link_selector: String,
    /// Attribute carrying the URL on the link element
    pub link_attribute: String,
}

impl ScanRule {
    /// Create and validate a scan rule.
    ///
    /// A rule with an empty item or link selector is a programming error,
    /// not a runtime condition, so this fails fast with a descriptive
    /// error.
    pub fn new(
        url_pattern: &str,
        item_selector: impl Into<String>,
        link_selector: impl Into<String>,
    ) -> Result<Self> {
        let item_selector = item_selector.into();
        let link_selector = link_selector.into();

        if item_selector.trim().is_empty() {
            return Err(RuleError::InvalidScanRule {
                reason: "item selector cannot be empty".to_string(),
            });
        }
        if link_selector.trim().is_empty() {
            return Err(RuleError::InvalidScanRule {
                reason: "link selector cannot be empty".to_string(),
            });
        }

        let url_pattern = Regex::new(url_pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: url_pattern.to_string(),
            source,
        })?;

        Ok(Self {
            url_pattern,
            item_selector,
            link_selector,
            link_attribute: DEFAULT_LINK_ATTRIBUTE.to_string(),
        })
    }

    /// Override the attribute the item URL is read from.
    #[must_use]
    pub fn with_link_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.link_attribute = attribute.into();
        self
    }

    /// Whether this rule applies to the given page URL.
    #[must_use]
    pub fn matches(&self, page_url: &str) -> bool {
        self.url_pattern.is_match(page_url)
    }
}

/// Immutable registry of scan rules, checked in declaration order.
#[derive(Debug, Clone)]
pub struct ScanRuleRegistry {
    rules: Vec<ScanRule>,
}

impl ScanRuleRegistry {
    /// Create a registry from an explicit rule list.
    #[must_use]
    pub fn new(rules: Vec<ScanRule>) -> Self {
        Self { rules }
    }

    /// Build the registry of shipped scan rules.
    #[must_use]
    pub fn builtin() -> Self {
        let rules = vec![ScanRule::new(
            r"^https?://(www\.)?linkedin\.com/jobs/search",
            ".job-details-jobs-unified-top-card__container--two-pane",
            ".job-details-jobs-unified-top-card__company-name a",
        )
        .expect("valid linkedin jobs scan rule")];

        Self::new(rules)
    }

    /// Find the first scan rule applying to the given page URL.
    ///
    /// Pages with no rule use whole-page classification only.
    #[must_use]
    pub fn find_match(&self, page_url: &str) -> Option<&ScanRule> {
        let rule = self.rules.iter().find(|rule| rule.matches(page_url));
        if let Some(rule) = rule {
            debug!(page_url, item_selector = %rule.item_selector, "found matching scan rule");
        }
        rule
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

impl Default for ScanRuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
