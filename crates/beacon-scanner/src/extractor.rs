//! Candidate item extraction.
//!
//! A pure read of the document: find containers matching the scan rule's
//! item selector, then pull the URL out of the nested link element.
//! Missing links, missing attributes and malformed URLs are not errors;
//! they yield no URL for that item and the caller decides how to mark it.

use crate::document::{DocumentTree, ElementId};
use beacon_rules::ScanRule;
use tracing::{debug, warn};
use url::Url;

/// Maximum containers examined per extraction call, bounding worst-case
/// cost on pathological pages.
pub const MAX_ITEMS_PER_SCAN: usize = 500;

/// A container element together with its extracted URL.
#[derive(Debug, Clone)]
pub struct ExtractedItem {
    /// The container element
    pub element: ElementId,
    /// The nested link element the URL was read from
    pub link: ElementId,
    /// The absolute item URL
    pub url: Url,
}

/// A queued unit of classification work.
///
/// Owned exclusively by the scanner controller until consumed by the
/// sequential checker, then discarded.
#[derive(Debug, Clone)]
pub struct ScanItem {
    /// The container element
    pub element: ElementId,
    /// The absolute item URL
    pub url: Url,
}

impl From<ExtractedItem> for ScanItem {
    fn from(item: ExtractedItem) -> Self {
        Self {
            element: item.element,
            url: item.url,
        }
    }
}

/// Extract every container with a resolvable URL from the document.
///
/// Containers are capped at [`MAX_ITEMS_PER_SCAN`]; containers without a
/// usable URL are skipped.
pub fn extract_all<D: DocumentTree + ?Sized>(document: &D, rule: &ScanRule) -> Vec<ExtractedItem> {
    let containers = document.select(&rule.item_selector, MAX_ITEMS_PER_SCAN);
    debug!(
        count = containers.len(),
        item_selector = %rule.item_selector,
        "found item containers"
    );

    containers
        .into_iter()
        .filter_map(|element| extract_one(document, element, rule))
        .collect()
}

/// Extract the URL from a single container element.
pub fn extract_one<D: DocumentTree + ?Sized>(
    document: &D,
    element: ElementId,
    rule: &ScanRule,
) -> Option<ExtractedItem> {
    let Some(link) = document.select_within(element, &rule.link_selector) else {
        debug!(
            %element,
            link_selector = %rule.link_selector,
            "no link element in item container"
        );
        return None;
    };

    let Some(raw) = document.attr(link, &rule.link_attribute) else {
        debug!(
            %element,
            attribute = %rule.link_attribute,
            "link element has no URL attribute"
        );
        return None;
    };

    let resolved = if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(&raw)
    } else {
        document.page_url().join(&raw)
    };

    match resolved {
        Ok(url) => Some(ExtractedItem { element, link, url }),
        Err(error) => {
            warn!(%element, raw, %error, "failed to resolve item URL");
            None
        }
    }
}
