//! The in-memory dataset with linear selector lookups.

use crate::record::DatasetRecord;
use beacon_core::FieldKey;

/// Immutable, in-memory dataset of curated entity records.
///
/// Constructed once per session and injected into the classifier; tests
/// substitute small fixture datasets. Lookups are linear scans by design:
/// the dataset is small, and the simplicity beats an index here.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<DatasetRecord>,
}

impl Dataset {
    /// Create a dataset from validated records.
    #[must_use]
    pub fn new(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    /// Find the first record whose `key` field equals `selector`.
    ///
    /// Both sides are compared with a leading `@` stripped (handles are
    /// stored with or without it), case-insensitively for field keys whose
    /// platforms treat identifiers as case-insensitive.
    #[must_use]
    pub fn find_by_selector(&self, key: FieldKey, selector: &str) -> Option<&DatasetRecord> {
        let needle = selector.strip_prefix('@').unwrap_or(selector);

        self.records.iter().find(|record| {
            record.field(key).is_some_and(|value| {
                let value = value.strip_prefix('@').unwrap_or(value);
                if key.is_case_insensitive() {
                    value.eq_ignore_ascii_case(needle)
                } else {
                    value == needle
                }
            })
        })
    }

    /// Find the first record whose website field equals the given domain.
    #[must_use]
    pub fn find_by_website(&self, domain: &str) -> Option<&DatasetRecord> {
        self.records
            .iter()
            .find(|record| record.website.as_deref() == Some(domain))
    }

    /// Number of records in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = &DatasetRecord> {
        self.records.iter()
    }
}
