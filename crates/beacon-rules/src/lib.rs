//! Beacon Rules - URL rules for platform selector extraction and item
//! scanning.
//!
//! This crate holds the two static rule families the classification engine
//! is driven by:
//!
//! - **Platform rules** ([`RuleRegistry`]): which URL shapes identify an
//!   entity on a supported platform, and how to pull the platform-specific
//!   selector (company slug, handle, channel id) out of a matching URL.
//! - **Scan rules** ([`ScanRuleRegistry`]): which pages require item-level
//!   scanning, which container elements on those pages are candidates, and
//!   how to find the URL nested inside each container.
//!
//! Both registries are immutable and explicitly constructed so tests can
//! substitute small fixtures.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod normalize;
pub mod platform;
pub mod registry;
pub mod scan;

// Re-export commonly used types
pub use error::{Result, RuleError};
pub use normalize::{normalize_url, registrable_domain};
pub use platform::{field_key_for, Platform};
pub use registry::{Rule, RuleRegistry};
pub use scan::{ScanRule, ScanRuleRegistry};
