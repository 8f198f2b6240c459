//! Beacon Store - Persistence for dismissals and durable flags.
//!
//! Provides `SQLite` key-value storage for the two maps the classification
//! core requires of its host environment:
//!
//! - a TTL map of dismissal timestamps (`dismissals` table), read on every
//!   classification and written on user dismiss actions
//! - a durable map for feature flags and shown-hint bookkeeping (`flags`
//!   table) with get/set/remove-by-prefix semantics
//!
//! An in-memory [`MemoryStore`] with the same dismissal surface backs
//! session-scoped hosts and tests.
//!
//! # Example
//!
//! ```ignore
//! use beacon_store::{dismissals, Store};
//!
//! let store = Store::new(":memory:").await?;
//! store.run_migrations().await?;
//! dismissals::set_dismissed(store.pool(), "li_acme", chrono::Utc::now()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod connection;
pub mod dismissals;
pub mod error;
pub mod flags;
pub mod memory;
pub mod migrations;

// Re-export commonly used types
pub use connection::Store;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
