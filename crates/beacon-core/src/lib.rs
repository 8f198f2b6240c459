//! Beacon Core - Foundation crate for the Beacon classification engine.
//!
//! This crate provides the shared domain types and error handling that all
//! other Beacon crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`types`] - Shared enums and the tagged classification result
//! - [`transport`] - The classification transport seam between the scanner
//!   and whichever host carries requests to the classifier
//!
//! # Example
//!
//! ```rust
//! use beacon_core::{Classification, FieldKey, Reason, SelectorMatch};
//!
//! let result = Classification::Flagged {
//!     name: "Acme".to_string(),
//!     reasons: vec![Reason::HeadquartersInRegion],
//!     alternatives: vec![],
//!     stock_symbol: None,
//!     comment: None,
//!     dismissed: false,
//!     matched: SelectorMatch::new(FieldKey::LinkedIn, "acme"),
//! };
//! assert!(result.is_flagged());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use transport::ClassificationTransport;
pub use types::{Alternative, Classification, FieldKey, Reason, SelectorMatch};
