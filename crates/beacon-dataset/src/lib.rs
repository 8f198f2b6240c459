//! Beacon Dataset - The curated entity dataset and its loader.
//!
//! The dataset is a bundled JSON array of entity records keyed implicitly
//! by per-platform selector fields. It is loaded once per session,
//! validated record by record (malformed records are skipped, never fatal),
//! and then queried with deliberate O(n) linear scans: the dataset is small
//! and an index structure would buy nothing.
//!
//! # Example
//!
//! ```rust
//! use beacon_core::FieldKey;
//! use beacon_dataset::{Dataset, DatasetLoader};
//!
//! let json = r#"[{"id": "1", "n": "Acme", "r": ["h"], "li": "acme"}]"#;
//! let dataset = DatasetLoader::from_str(json).expect("parse dataset");
//! let record = dataset.find_by_selector(FieldKey::LinkedIn, "acme");
//! assert_eq!(record.map(|r| r.name.as_str()), Some("Acme"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod dataset;
pub mod error;
pub mod loader;
pub mod record;

// Re-export commonly used types
pub use dataset::Dataset;
pub use error::{DatasetError, Result};
pub use loader::DatasetLoader;
pub use record::DatasetRecord;
