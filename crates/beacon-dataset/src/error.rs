//! Error types for the dataset subsystem.

use thiserror::Error;

/// Errors that can occur while loading or validating the dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("failed to read dataset from {path}: {source}")]
    ReadError {
        /// Path to the dataset file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The dataset file is not a JSON array of records
    #[error("failed to parse dataset: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A record failed schema validation
    #[error("invalid dataset record {id}: {reason}")]
    ValidationError {
        /// Record id (or its index when no id is present)
        id: String,
        /// Reason for validation failure
        reason: String,
    },
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
