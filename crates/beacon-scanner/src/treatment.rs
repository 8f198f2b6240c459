//! Visual treatment application and teardown.
//!
//! `TreatmentApplier` owns the per-element treatment lifecycle: idempotent
//! overlay application with a dismiss affordance, the dismissal round trip
//! through the classification transport, the processed/passed markers, and
//! the conservative whole-page reset used on navigation teardown.

use crate::document::{DocumentTree, ElementId};
use crate::extractor::ScanItem;
use crate::markers::{ElementState, MarkerTable, Overlay, PASSED_BORDER_STYLE};
use beacon_core::{Classification, ClassificationTransport, Reason};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// The detached root the hover tooltip renders into.
///
/// Created on scanner activation, removed on stop. Rendering itself is a
/// host concern; the root only tracks what the tooltip would show.
#[derive(Debug, Clone, Default)]
pub struct OverlayRoot {
    tooltip: Option<Tooltip>,
}

impl OverlayRoot {
    /// Show the tooltip for an element.
    pub fn show(&mut self, tooltip: Tooltip) {
        self.tooltip = Some(tooltip);
    }

    /// Hide the tooltip.
    pub fn hide(&mut self) {
        self.tooltip = None;
    }

    /// The currently visible tooltip, if any.
    #[must_use]
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }
}

/// Content of the hover tooltip for a flagged element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    /// The hovered element
    pub element: ElementId,
    /// Matched entity name
    pub name: Option<String>,
    /// Matched reason codes
    pub reasons: Vec<Reason>,
}

/// Applies and removes treatment on single elements.
pub struct TreatmentApplier<D> {
    table: Rc<RefCell<MarkerTable>>,
    document: Rc<D>,
    transport: Rc<dyn ClassificationTransport>,
}

impl<D: DocumentTree> TreatmentApplier<D> {
    /// Create an applier over the shared marker table.
    pub fn new(
        table: Rc<RefCell<MarkerTable>>,
        document: Rc<D>,
        transport: Rc<dyn ClassificationTransport>,
    ) -> Self {
        Self {
            table,
            document,
            transport,
        }
    }

    /// Apply warning treatment for a flagged, undismissed result.
    ///
    /// Idempotent: an overlay already present on the element is reused,
    /// never duplicated. Records enough of the result on the element to
    /// support tooltip rendering and dismissal without re-classification.
    /// Dismissed, hint and safe results get no treatment.
    pub fn apply(&self, item: &ScanItem, result: &Classification) {
        let Classification::Flagged {
            name,
            reasons,
            dismissed: false,
            matched,
            ..
        } = result
        else {
            return;
        };

        let mut table = self.table.borrow_mut();
        let state = table.state_mut(item.element);

        state.processed = true;
        state.flagged = true;
        state.name = Some(name.clone());
        state.reasons = reasons.clone();
        state.matched = Some(matched.clone());
        state.url = Some(item.url.to_string());

        if state.overlay.is_none() {
            state.overlay = Some(Overlay { dismissible: true });
            debug!(element = %item.element, "created overlay with dismiss affordance");
        }
    }

    /// Remove warning treatment from an element, keeping its markers.
    pub fn remove(&self, element: ElementId) {
        let mut table = self.table.borrow_mut();
        let state = table.state_mut(element);
        state.flagged = false;
        state.name = None;
        state.reasons.clear();
        state.overlay = None;
    }

    /// Mark an element as visited; it is never scanned again.
    pub fn mark_processed(&self, element: ElementId) {
        self.table.borrow_mut().state_mut(element).processed = true;
    }

    /// Mark an element as classified safe.
    ///
    /// Sets the debug border on attached elements; detached elements are
    /// left untouched.
    pub fn mark_passed(&self, element: ElementId) {
        if !self.document.is_attached(element) {
            return;
        }

        let mut table = self.table.borrow_mut();
        let state = table.state_mut(element);
        state.processed = true;
        state.passed = true;
        state.border = Some(PASSED_BORDER_STYLE.to_string());
    }

    /// Whether the element carries the processed marker.
    #[must_use]
    pub fn is_processed(&self, element: ElementId) -> bool {
        self.table.borrow().is_processed(element)
    }

    /// Dismiss the warning on an element.
    ///
    /// Sends the stored field key and selector to the persistence
    /// collaborator; on acknowledgement removes the treatment and marks
    /// the element processed. Subsequent classifications of the same
    /// selector report `dismissed: true` for the TTL window. Transport
    /// failures degrade to "not dismissed".
    pub async fn dismiss(&self, element: ElementId) -> bool {
        let matched = self
            .table
            .borrow()
            .state(element)
            .and_then(|state| state.matched.clone());

        let Some(matched) = matched else {
            debug!(%element, "dismiss requested for element without stored selector");
            return false;
        };

        match self
            .transport
            .dismiss_url(matched.key, &matched.selector)
            .await
        {
            Ok(true) => {
                self.remove(element);
                self.mark_processed(element);
                debug!(
                    %element,
                    key = matched.dismissal_key(),
                    "dismissed; suppression persists for the TTL window"
                );
                true
            }
            Ok(false) => false,
            Err(error) => {
                warn!(%element, %error, "dismiss request failed");
                false
            }
        }
    }

    /// Remove every scanner-owned marker and overlay from every element.
    ///
    /// Used on navigation teardown. Style reverts are conservative: the
    /// border slot is cleared only when it still holds the scanner's own
    /// passed-marker style; host styling the scanner cannot attribute to
    /// itself is never reverted. Returns the number of reset elements.
    pub fn reset_all(&self) -> usize {
        let mut table = self.table.borrow_mut();
        let marked = table.marked_elements();

        for element in &marked {
            let Some(state) = table.remove(*element) else {
                continue;
            };

            let foreign_border = state
                .border
                .filter(|border| border != PASSED_BORDER_STYLE);
            if let Some(border) = foreign_border {
                table.insert(
                    *element,
                    ElementState {
                        border: Some(border),
                        ..ElementState::default()
                    },
                );
            }
        }

        debug!(count = marked.len(), "reset all element treatment");
        marked.len()
    }
}
