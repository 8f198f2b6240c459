//! The element marker side table.
//!
//! Markers (processed / flagged / passed), stored result data and overlay
//! state live in a table keyed by element identity, not on tree nodes, so
//! the scanner core is testable without a real document implementation.
//! The table is owned exclusively by the scanner while it is active and
//! reset wholesale on navigation teardown.

use crate::document::ElementId;
use beacon_core::{Reason, SelectorMatch};
use std::collections::HashMap;

/// The inline border style the passed marker sets on elements.
pub const PASSED_BORDER_STYLE: &str = "2px solid #22c55e";

/// Overlay markup attached to a flagged element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Whether the overlay carries a dismiss affordance
    pub dismissible: bool,
}

/// Scanner-owned state of one element.
#[derive(Debug, Clone, Default)]
pub struct ElementState {
    /// Visited by the sequential checker; never scanned again
    pub processed: bool,
    /// Carrying a warning overlay
    pub flagged: bool,
    /// Classified safe
    pub passed: bool,
    /// Matched entity name, for tooltip rendering
    pub name: Option<String>,
    /// Matched reason codes, for tooltip rendering
    pub reasons: Vec<Reason>,
    /// The field/selector pair, for dismissal without re-classification
    pub matched: Option<SelectorMatch>,
    /// The item URL the result came from
    pub url: Option<String>,
    /// Overlay markup, when flagged
    pub overlay: Option<Overlay>,
    /// The element's inline border style slot; the host may also write it
    pub border: Option<String>,
}

impl ElementState {
    /// Whether any scanner-owned marker or data is present.
    ///
    /// A foreign border alone does not count: that slot may have been
    /// written by the host page.
    #[must_use]
    pub fn has_scanner_markers(&self) -> bool {
        self.processed
            || self.flagged
            || self.passed
            || self.name.is_some()
            || !self.reasons.is_empty()
            || self.matched.is_some()
            || self.url.is_some()
            || self.overlay.is_some()
    }
}

/// Side table mapping element identity to scanner-owned state.
#[derive(Debug, Default)]
pub struct MarkerTable {
    states: HashMap<ElementId, ElementState>,
}

impl MarkerTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The state of an element, if any was recorded.
    #[must_use]
    pub fn state(&self, element: ElementId) -> Option<&ElementState> {
        self.states.get(&element)
    }

    /// Mutable state of an element, created on first access.
    pub fn state_mut(&mut self, element: ElementId) -> &mut ElementState {
        self.states.entry(element).or_default()
    }

    /// Whether the element carries the processed marker.
    #[must_use]
    pub fn is_processed(&self, element: ElementId) -> bool {
        self.states
            .get(&element)
            .is_some_and(|state| state.processed)
    }

    /// Elements carrying any scanner-owned marker.
    #[must_use]
    pub fn marked_elements(&self) -> Vec<ElementId> {
        let mut elements: Vec<ElementId> = self
            .states
            .iter()
            .filter(|(_, state)| state.has_scanner_markers())
            .map(|(element, _)| *element)
            .collect();
        elements.sort_unstable();
        elements
    }

    /// Remove an element's state entirely.
    pub fn remove(&mut self, element: ElementId) -> Option<ElementState> {
        self.states.remove(&element)
    }

    /// Re-insert state for an element (used by conservative resets).
    pub fn insert(&mut self, element: ElementId, state: ElementState) {
        self.states.insert(element, state);
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
