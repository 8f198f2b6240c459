//! Error types for the scanner subsystem.
//!
//! Most scanner failure modes are deliberately not errors: extraction and
//! transport failures degrade to "element processed without treatment" so
//! the scan loop always makes forward progress.

use thiserror::Error;

/// Errors that can occur in scanner operations.
#[derive(Error, Debug)]
pub enum ScannerError {
    /// An event bus has reached its subscriber limit
    #[error("subscriber limit reached ({limit})")]
    SubscriberLimit {
        /// The bounded subscriber capacity
        limit: usize,
    },

    /// The classification transport failed
    #[error("transport error: {0}")]
    Transport(#[from] beacon_core::CoreError),
}

/// Result type for scanner operations.
pub type Result<T> = std::result::Result<T, ScannerError>;
