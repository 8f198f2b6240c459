//! Error types for the classifier subsystem.

use thiserror::Error;

/// Errors that can occur during classification.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Rule evaluation failed (pattern or field-key mapping)
    #[error("rule error: {0}")]
    Rule(#[from] beacon_rules::RuleError),

    /// The dismissal store failed
    #[error("store error: {0}")]
    Store(#[from] beacon_store::StoreError),
}

/// Result type for classifier operations.
pub type Result<T> = std::result::Result<T, ClassifierError>;
