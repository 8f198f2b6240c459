//! Dataset loading from the bundled JSON file.
//!
//! The file is an array of records. Records that fail to deserialize or
//! validate are logged and skipped; a malformed record never takes the
//! whole dataset down.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::record::DatasetRecord;
use std::path::Path;
use tracing::{info, warn};

/// Loader for the curated entity dataset.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load the dataset from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| crate::error::DatasetError::ReadError {
                path: path.display().to_string(),
                source,
            })?;

        let dataset = Self::from_str(&contents)?;
        info!(
            count = dataset.len(),
            path = %path.display(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Load the dataset from a JSON string.
    ///
    /// The outer value must be an array; individual records that fail
    /// schema validation are skipped with a warning.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Dataset> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(contents)?;

        let mut records = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            let record: DatasetRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(error) => {
                    warn!(index, %error, "skipping undecodable dataset record");
                    continue;
                }
            };

            if let Err(error) = record.validate() {
                warn!(index, %error, "skipping invalid dataset record");
                continue;
            }

            records.push(record);
        }

        Ok(Dataset::new(records))
    }
}
