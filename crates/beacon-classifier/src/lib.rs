//! Beacon Classifier - URL classification against the curated dataset.
//!
//! The classifier normalizes a URL, finds a matching platform rule,
//! extracts the platform selector, looks it up in the dataset, resolves the
//! user's dismissal state against the 30-day TTL, and returns a tagged
//! [`Classification`](beacon_core::Classification).
//!
//! The host-facing surface is the [`MessageHandler`], which routes the
//! transport requests (`TestUrl`, `DismissUrl`, `RequestUrlTest`) to the
//! classifier and the dismissal store.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use beacon_classifier::Classifier;
//!
//! let classifier = Classifier::new(
//!     Arc::new(rule_registry),
//!     Arc::new(dataset),
//!     Arc::new(dismissal_store),
//! );
//! let result = classifier.classify("https://www.linkedin.com/company/acme").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod classifier;
pub mod dismissal;
pub mod error;
pub mod messages;

// Re-export commonly used types
pub use classifier::Classifier;
pub use dismissal::{DismissalStore, DISMISSAL_TTL_DAYS};
pub use error::{ClassifierError, Result};
pub use messages::{MessageHandler, Request, Response};
