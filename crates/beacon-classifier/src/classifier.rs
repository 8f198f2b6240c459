//! The URL classification algorithm.

use crate::dismissal::{is_still_valid, DismissalStore};
use crate::error::Result;
use beacon_core::{Classification, FieldKey, SelectorMatch};
use beacon_dataset::{Dataset, DatasetRecord};
use beacon_rules::{field_key_for, normalize_url, registrable_domain, RuleRegistry};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reserved regional domain suffix that short-circuits classification.
pub const REGIONAL_SUFFIX: &str = ".il";

/// Hint text for regional-suffix results.
const REGIONAL_HINT_TEXT: &str = "This website is served from the flagged regional domain space.";

/// Link presented with regional-suffix hints.
const REGIONAL_HINT_URL: &str = "https://beacon-watch.github.io";

/// Classifies URLs against the platform rules and the curated dataset.
///
/// All collaborators are injected at construction so tests can substitute
/// fixture registries, datasets and stores.
pub struct Classifier {
    rules: Arc<RuleRegistry>,
    dataset: Arc<Dataset>,
    dismissals: Arc<dyn DismissalStore>,
}

impl Classifier {
    /// Create a new classifier.
    #[must_use]
    pub fn new(
        rules: Arc<RuleRegistry>,
        dataset: Arc<Dataset>,
        dismissals: Arc<dyn DismissalStore>,
    ) -> Self {
        Self {
            rules,
            dataset,
            dismissals,
        }
    }

    /// Classify a URL.
    ///
    /// Steps: compute the registrable domain; short-circuit the reserved
    /// regional suffix to a fixed hint; match a platform rule on the
    /// normalized URL and extract the selector; resolve dismissal state
    /// against the TTL store; look the selector up in the dataset. URLs
    /// matching no rule fall back to a website-field lookup on the domain.
    pub async fn classify(&self, url: &str) -> Result<Classification> {
        let domain = registrable_domain(url);

        // Regional-suffix hints never consult the dataset and are not
        // dismissible; repetition is governed by the transport layer.
        if !domain.is_empty() && domain.ends_with(REGIONAL_SUFFIX) {
            return Ok(Classification::Hint {
                name: domain.clone(),
                hint_text: REGIONAL_HINT_TEXT.to_string(),
                hint_url: REGIONAL_HINT_URL.to_string(),
                matched: SelectorMatch::new(FieldKey::RegionalSuffix, domain),
            });
        }

        let normalized = normalize_url(url);

        let Some(rule) = self.rules.find_match(&normalized) else {
            return self.classify_by_website(&domain).await;
        };

        let Some(selector) = rule.extract(&normalized) else {
            // A matched rule with no extractable selector is safe, not an
            // error: the captured segment was a platform route.
            debug!(url, platform = %rule.platform(), "rule matched but no selector extracted");
            return Ok(Classification::Safe);
        };

        let key = field_key_for(rule.platform(), Some(&normalized))?;
        let matched = SelectorMatch::new(key, selector);
        debug!(
            url,
            selector = %matched.selector,
            key = %matched.key,
            "testing selector against dataset"
        );

        if self.is_dismissed(&matched.dismissal_key()).await {
            // The display fields are not needed while dismissed
            return Ok(Classification::Flagged {
                name: domain,
                reasons: vec![],
                alternatives: vec![],
                stock_symbol: None,
                comment: None,
                dismissed: true,
                matched,
            });
        }

        match self.dataset.find_by_selector(key, &matched.selector) {
            Some(record) => Ok(Self::resolve_record(record, matched)),
            None => Ok(Classification::Safe),
        }
    }

    /// Website-field fallback for URLs matching no platform rule.
    async fn classify_by_website(&self, domain: &str) -> Result<Classification> {
        if domain.is_empty() {
            return Ok(Classification::Safe);
        }

        let matched = SelectorMatch::new(FieldKey::Website, domain);

        if self.is_dismissed(&matched.dismissal_key()).await {
            return Ok(Classification::Flagged {
                name: domain.to_string(),
                reasons: vec![],
                alternatives: vec![],
                stock_symbol: None,
                comment: None,
                dismissed: true,
                matched,
            });
        }

        match self.dataset.find_by_website(domain) {
            Some(record) => Ok(Self::resolve_record(record, matched)),
            None => Ok(Classification::Safe),
        }
    }

    /// Turn a matched dataset record into a hint or flagged result.
    fn resolve_record(record: &DatasetRecord, matched: SelectorMatch) -> Classification {
        if record.is_hint() {
            return Classification::Hint {
                name: record.name.clone(),
                hint_text: record.hint_text.clone().unwrap_or_default(),
                hint_url: record.hint_url.clone().unwrap_or_default(),
                matched,
            };
        }

        Classification::Flagged {
            name: record.name.clone(),
            reasons: record.reasons.clone(),
            alternatives: record.alternatives.clone().unwrap_or_default(),
            stock_symbol: record.stock_symbol.clone(),
            comment: record.comment.clone(),
            dismissed: false,
            matched,
        }
    }

    /// Whether a still-valid dismissal exists for the given key.
    ///
    /// Store failures degrade to "not dismissed": classification fails
    /// open toward showing the warning, never toward hiding it.
    async fn is_dismissed(&self, key: &str) -> bool {
        match self.dismissals.dismissed_at(key).await {
            Ok(Some(at)) => {
                let valid = is_still_valid(at, Utc::now());
                debug!(key, valid, "found dismissal timestamp");
                valid
            }
            Ok(None) => false,
            Err(error) => {
                warn!(key, %error, "dismissal lookup failed, treating as not dismissed");
                false
            }
        }
    }
}
