//! Error types for the rules subsystem.

use thiserror::Error;

/// Errors that can occur in rule operations.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A rule pattern failed to compile
    #[error("invalid rule pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern source
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// A scan rule is missing a required selector
    #[error("invalid scan rule: {reason}")]
    InvalidScanRule {
        /// Reason for validation failure
        reason: String,
    },

    /// A field-key mapping was requested without the URL context needed to
    /// disambiguate it
    #[error("field key for {platform} requires URL context to disambiguate")]
    AmbiguousFieldKey {
        /// The platform whose mapping is URL-dependent
        platform: String,
    },
}

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
