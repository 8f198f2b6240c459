//! Core error types for the Beacon workspace.
//!
//! This module defines the central error type shared across subsystem
//! boundaries. Subsystems with richer failure vocabularies define their own
//! error enums and convert into `CoreError` at the seams.

use thiserror::Error;

/// Central error type for cross-subsystem operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport errors (classification or dismissal round trips)
    #[error("transport error: {0}")]
    Transport(String),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Validation("empty selector".to_string());
        assert_eq!(err.to_string(), "validation error: empty selector");

        let err = CoreError::Transport("channel closed".to_string());
        assert_eq!(err.to_string(), "transport error: channel closed");
    }
}
