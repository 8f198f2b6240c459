//! Beacon Scanner - Incremental page scanning and visual treatment.
//!
//! The scanner is a page-embedded state machine that discovers candidate
//! content elements as the document mutates and scrolls, rate-limits
//! classification requests, and applies or removes visual treatment
//! idempotently.
//!
//! # Architecture
//!
//! - [`document`] - The document seam: stable element handles, geometry,
//!   and an HTML-backed implementation over `scraper`
//! - [`extractor`] - Candidate container discovery and nested URL
//!   extraction
//! - [`events`] - Publisher/subscriber channels standing in for the host's
//!   visibility and mutation observers
//! - [`markers`] - The element marker side table (processed / flagged /
//!   passed plus stored result data)
//! - [`treatment`] - Idempotent overlay application, dismissal round trips
//!   and conservative teardown
//! - [`cache`] - The bounded classification result cache
//! - [`controller`] - The `Idle → Initializing → Active → Stopped` state
//!   machine driving it all
//!
//! Everything runs on a single-threaded cooperative event loop; suspension
//! points are the settle delay, the debounce delay, the inter-item delay
//! and the classification round trip.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cache;
pub mod controller;
pub mod document;
pub mod error;
pub mod events;
pub mod extractor;
pub mod markers;
pub mod treatment;

// Re-export commonly used types
pub use cache::{ResultCache, RESULT_CACHE_CAPACITY};
pub use controller::{PageEvent, Phase, ScannerConfig, ScannerController};
pub use document::{DocumentTree, ElementId, HtmlDocument, Rect};
pub use error::{Result, ScannerError};
pub use events::{EventBus, SubscriptionId, MAX_SUBSCRIBERS};
pub use extractor::{extract_all, extract_one, ExtractedItem, ScanItem, MAX_ITEMS_PER_SCAN};
pub use markers::{ElementState, MarkerTable, Overlay, PASSED_BORDER_STYLE};
pub use treatment::{OverlayRoot, Tooltip, TreatmentApplier};
