//! The classification transport seam.
//!
//! The scanner never calls the classifier directly; it talks to whatever
//! transport the host environment provides (extension message passing, an
//! in-process handler, a bot command pipeline). The contract is small:
//! give it a URL, get back a classification; ask it to persist a dismissal,
//! get back an acknowledgement.

use crate::error::Result;
use crate::types::{Classification, FieldKey};
use async_trait::async_trait;

/// Request/response transport carrying classification traffic to the host.
///
/// Implementations are expected to be used from a single-threaded event
/// loop, so the trait is not `Send`.
#[async_trait(?Send)]
pub trait ClassificationTransport {
    /// Classify a URL. `Classification::Safe` is the absence of a match.
    async fn test_url(&self, url: &str) -> Result<Classification>;

    /// Persist a dismissal for the given field key and selector.
    ///
    /// Returns `true` when the dismissal was stored; subsequent
    /// classifications of the same selector report `dismissed: true` for
    /// the TTL window.
    async fn dismiss_url(&self, key: FieldKey, selector: &str) -> Result<bool>;
}
