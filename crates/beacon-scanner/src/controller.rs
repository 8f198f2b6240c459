//! The incremental scanner state machine.
//!
//! `ScannerController` runs `Idle → Initializing → Active → Stopped`:
//! a navigation matching a scan rule schedules activation after a settle
//! delay; activation creates the overlay root, subscribes to the host's
//! visibility and mutation buses and synchronously scans the currently
//! visible items; stop tears everything down synchronously so no pending
//! timer or observer callback can touch the element tree afterwards. From
//! `Stopped` the only legal transition is back to `Initializing` on a
//! fresh navigation.
//!
//! The controller is a single-threaded cooperative actor: one `run()` loop
//! multiplexes the event channel with three timer slots (activation,
//! debounce flush, drain step). Suspension points are exactly the settle
//! delay, the debounce delay, the inter-item delay and the classification
//! round trip.

use crate::cache::{ResultCache, RESULT_CACHE_CAPACITY};
use crate::document::{DocumentTree, ElementId};
use crate::events::{EventBus, SubscriptionId};
use crate::extractor::{extract_one, ScanItem, MAX_ITEMS_PER_SCAN};
use crate::markers::MarkerTable;
use crate::treatment::{OverlayRoot, Tooltip, TreatmentApplier};
use beacon_core::{Classification, ClassificationTransport};
use beacon_rules::{ScanRule, ScanRuleRegistry};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Settle delay before activation, letting the host page finish its own
/// initial render.
pub const SETTLE_DELAY_MS: u64 = 1000;

/// Debounce delay between a queue addition and the flush it schedules.
pub const DEBOUNCE_MS: u64 = 1000;

/// Inter-item delay inside a drain; deliberate client-side rate limiting
/// of the classification transport.
pub const CHECK_DELAY_MS: u64 = 100;

/// Margin the viewport is expanded by when deciding item visibility.
pub const VIEWPORT_MARGIN_PX: f64 = 100.0;

/// Tunables of the scanner state machine.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Delay between a matching navigation and activation
    pub settle_delay: Duration,
    /// Debounce delay before a pending-queue flush
    pub debounce: Duration,
    /// Delay between sequential classification requests
    pub check_delay: Duration,
    /// Viewport expansion margin for visibility decisions
    pub viewport_margin: f64,
    /// Capacity of the classification result cache
    pub cache_capacity: usize,
    /// Container cap per extraction pass
    pub max_items: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            check_delay: Duration::from_millis(CHECK_DELAY_MS),
            viewport_margin: VIEWPORT_MARGIN_PX,
            cache_capacity: RESULT_CACHE_CAPACITY,
            max_items: MAX_ITEMS_PER_SCAN,
        }
    }
}

/// Lifecycle phase of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Never started on this page
    Idle,
    /// Waiting out the settle delay
    Initializing,
    /// Observing and classifying
    Active,
    /// Torn down; only a fresh navigation restarts it
    Stopped,
}

/// Events the host delivers to the scanner.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// The host detected a navigation
    Navigated {
        /// The new page URL
        url: String,
    },
    /// Structural mutation added elements matching the item selector
    ElementsAdded(Vec<ElementId>),
    /// An observed element became visible
    ElementVisible(ElementId),
    /// Pointer entered an element
    PointerEnter(ElementId),
    /// Pointer left an element
    PointerLeave(ElementId),
    /// The user activated an element's dismiss affordance
    DismissRequested(ElementId),
    /// Component teardown; ends the run loop
    Shutdown,
}

/// The incremental scanner state machine.
pub struct ScannerController<D> {
    config: ScannerConfig,
    scan_rules: Arc<ScanRuleRegistry>,
    document: Rc<D>,
    transport: Rc<dyn ClassificationTransport>,
    markers: Rc<RefCell<MarkerTable>>,
    treatment: TreatmentApplier<D>,
    overlay: Rc<RefCell<Option<OverlayRoot>>>,
    visibility: Rc<EventBus<ElementId>>,
    mutations: Rc<EventBus<Vec<ElementId>>>,
    events_tx: mpsc::UnboundedSender<PageEvent>,
    events_rx: mpsc::UnboundedReceiver<PageEvent>,

    phase: Phase,
    rule: Option<ScanRule>,
    pending: Vec<ElementId>,
    check_queue: VecDeque<ScanItem>,
    cache: ResultCache,
    visibility_sub: Option<SubscriptionId>,
    mutations_sub: Option<SubscriptionId>,

    activate_at: Option<Instant>,
    flush_at: Option<Instant>,
    drain_at: Option<Instant>,
    draining: bool,
}

impl<D: DocumentTree> ScannerController<D> {
    /// Create a controller over the given document and host channels.
    pub fn new(
        config: ScannerConfig,
        scan_rules: Arc<ScanRuleRegistry>,
        document: Rc<D>,
        transport: Rc<dyn ClassificationTransport>,
        visibility: Rc<EventBus<ElementId>>,
        mutations: Rc<EventBus<Vec<ElementId>>>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let markers = Rc::new(RefCell::new(MarkerTable::new()));
        let treatment =
            TreatmentApplier::new(markers.clone(), document.clone(), transport.clone());
        let cache = ResultCache::new(config.cache_capacity);

        Self {
            config,
            scan_rules,
            document,
            transport,
            markers,
            treatment,
            overlay: Rc::new(RefCell::new(None)),
            visibility,
            mutations,
            events_tx,
            events_rx,
            phase: Phase::Idle,
            rule: None,
            pending: Vec::new(),
            check_queue: VecDeque::new(),
            cache,
            visibility_sub: None,
            mutations_sub: None,
            activate_at: None,
            flush_at: None,
            drain_at: None,
            draining: false,
        }
    }

    /// A sender for delivering [`PageEvent`]s to the run loop.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.events_tx.clone()
    }

    /// The shared marker table (element state side table).
    #[must_use]
    pub fn markers(&self) -> Rc<RefCell<MarkerTable>> {
        self.markers.clone()
    }

    /// The shared overlay root slot (present only while active).
    #[must_use]
    pub fn overlay(&self) -> Rc<RefCell<Option<OverlayRoot>>> {
        self.overlay.clone()
    }

    /// The current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drive the state machine until shutdown.
    ///
    /// Multiplexes the event channel with the activation, flush and drain
    /// timers. Events always win over timers, so late observer callbacks
    /// after a stop are consumed (and ignored) before any timer could
    /// resurrect state.
    pub async fn run(&mut self) {
        loop {
            tokio::select! {
                biased;
                maybe_event = self.events_rx.recv() => {
                    match maybe_event {
                        None | Some(PageEvent::Shutdown) => {
                            self.stop();
                            break;
                        }
                        Some(event) => self.handle_event(event).await,
                    }
                }
                () = Self::deadline(self.activate_at), if self.activate_at.is_some() => {
                    self.activate();
                }
                () = Self::deadline(self.flush_at), if self.flush_at.is_some() => {
                    self.flush();
                }
                () = Self::deadline(self.drain_at), if self.drain_at.is_some() => {
                    self.drain_one().await;
                }
            }
        }
    }

    async fn deadline(at: Option<Instant>) {
        match at {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }

    async fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Navigated { url } => self.on_navigated(&url),
            PageEvent::ElementVisible(element) => self.queue_candidate(element),
            PageEvent::ElementsAdded(elements) => {
                for element in elements {
                    self.queue_candidate(element);
                }
            }
            PageEvent::PointerEnter(element) => self.show_tooltip(element),
            PageEvent::PointerLeave(_) => self.hide_tooltip(),
            PageEvent::DismissRequested(element) => {
                if self.phase == Phase::Active && self.treatment.dismiss(element).await {
                    self.hide_tooltip();
                }
            }
            // Handled by the run loop
            PageEvent::Shutdown => {}
        }
    }

    /// Handle a navigation: tear down any active scan, then initialize
    /// when the new page matches a scan rule.
    fn on_navigated(&mut self, url: &str) {
        if matches!(self.phase, Phase::Initializing | Phase::Active) {
            self.stop();
        }

        match self.scan_rules.find_match(url) {
            Some(rule) => {
                self.rule = Some(rule.clone());
                self.phase = Phase::Initializing;
                self.activate_at = Some(Instant::now() + self.config.settle_delay);
                info!(url, "navigation matched a scan rule, activating after settle delay");
            }
            None => {
                debug!(url, "no scan rule for page");
            }
        }
    }

    /// Activation: overlay root, observers, initial visible-item scan.
    fn activate(&mut self) {
        self.activate_at = None;
        if self.phase != Phase::Initializing {
            return;
        }
        self.phase = Phase::Active;

        *self.overlay.borrow_mut() = Some(OverlayRoot::default());

        let tx = self.events_tx.clone();
        match self.visibility.subscribe(move |element: &ElementId| {
            let _ = tx.send(PageEvent::ElementVisible(*element));
        }) {
            Ok(id) => self.visibility_sub = Some(id),
            Err(error) => warn!(%error, "failed to observe visibility"),
        }

        let tx = self.events_tx.clone();
        match self.mutations.subscribe(move |elements: &Vec<ElementId>| {
            let _ = tx.send(PageEvent::ElementsAdded(elements.clone()));
        }) {
            Ok(id) => self.mutations_sub = Some(id),
            Err(error) => warn!(%error, "failed to observe mutations"),
        }

        self.scan_visible_items();
        info!(queued = self.check_queue.len(), "scanner active");
    }

    /// Synchronously extract and enqueue all currently visible items.
    fn scan_visible_items(&mut self) {
        let Some(rule) = self.rule.clone() else {
            return;
        };

        let view = self.document.viewport().expand(self.config.viewport_margin);
        for element in self.document.select(&rule.item_selector, self.config.max_items) {
            if self.treatment.is_processed(element) {
                continue;
            }
            let Some(rect) = self.document.bounding_box(element) else {
                continue;
            };
            if !view.intersects(&rect) {
                continue;
            }

            match extract_one(self.document.as_ref(), element, &rule) {
                Some(item) => self.check_queue.push_back(item.into()),
                // No URL: terminal, the element is never retried
                None => self.treatment.mark_processed(element),
            }
        }

        if !self.check_queue.is_empty() {
            self.request_drain();
        }
    }

    /// Add a candidate element to the pending set and schedule the
    /// debounced flush.
    fn queue_candidate(&mut self, element: ElementId) {
        if self.phase != Phase::Active {
            return;
        }
        if self.treatment.is_processed(element) || self.pending.contains(&element) {
            return;
        }

        self.pending.push(element);
        if self.flush_at.is_none() {
            self.flush_at = Some(Instant::now() + self.config.debounce);
        }
    }

    /// Flush the pending set: drop detached elements, keep out-of-view
    /// elements queued, extract the rest into the check queue.
    fn flush(&mut self) {
        self.flush_at = None;
        let Some(rule) = self.rule.clone() else {
            return;
        };

        let view = self.document.viewport().expand(self.config.viewport_margin);
        let mut kept = Vec::new();
        let mut extracted = 0usize;

        for element in std::mem::take(&mut self.pending) {
            if self.treatment.is_processed(element) {
                continue;
            }
            if !self.document.is_attached(element) {
                debug!(%element, "dropping detached element from queue");
                continue;
            }

            let in_view = self
                .document
                .bounding_box(element)
                .is_some_and(|rect| view.intersects(&rect));
            if !in_view {
                // Left in the queue for a future flush
                kept.push(element);
                continue;
            }

            match extract_one(self.document.as_ref(), element, &rule) {
                Some(item) => {
                    self.check_queue.push_back(item.into());
                    extracted += 1;
                }
                None => self.treatment.mark_processed(element),
            }
        }

        self.pending = kept;
        debug!(
            extracted,
            deferred = self.pending.len(),
            "flushed pending queue"
        );

        if !self.check_queue.is_empty() {
            self.request_drain();
        }
    }

    /// Start a drain unless one is already in flight.
    ///
    /// The reentrancy guard makes the in-flight drain the single consumer
    /// of the check queue: items appended meanwhile are observed by it,
    /// never processed twice and never dropped.
    fn request_drain(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        self.drain_at = Some(Instant::now());
    }

    /// Process one item of the check queue, then reschedule.
    async fn drain_one(&mut self) {
        self.drain_at = None;

        let Some(item) = self.check_queue.pop_front() else {
            self.draining = false;
            return;
        };

        if self.treatment.is_processed(item.element) {
            self.drain_at = Some(Instant::now());
            return;
        }

        if let Some(result) = self.cache.get(item.url.as_str()).cloned() {
            debug!(url = %item.url, "classification cache hit");
            self.finish_item(&item, &result);
            self.drain_at = Some(Instant::now());
            return;
        }

        match self.transport.test_url(item.url.as_str()).await {
            Ok(result) => {
                self.cache.insert(item.url.to_string(), result.clone());
                self.finish_item(&item, &result);
            }
            Err(error) => {
                // Unresolved, but still processed: forward progress beats
                // a retry loop
                warn!(url = %item.url, %error, "classification failed, marking processed");
                self.treatment.mark_processed(item.element);
            }
        }

        self.drain_at = Some(Instant::now() + self.config.check_delay);
    }

    /// Apply the classification outcome to an element and mark it
    /// processed.
    fn finish_item(&mut self, item: &ScanItem, result: &Classification) {
        match result {
            Classification::Flagged {
                dismissed: false, ..
            } => self.treatment.apply(item, result),
            Classification::Safe => self.treatment.mark_passed(item.element),
            // Dismissed and hint results get no item treatment
            _ => {}
        }
        self.treatment.mark_processed(item.element);
    }

    /// Synchronous teardown: cancel timers, disconnect observers, clear
    /// queues, remove overlay and tooltip, reset all element markers.
    fn stop(&mut self) {
        self.activate_at = None;
        self.flush_at = None;
        self.drain_at = None;
        self.draining = false;
        self.pending.clear();
        self.check_queue.clear();

        if let Some(id) = self.visibility_sub.take() {
            self.visibility.unsubscribe(id);
        }
        if let Some(id) = self.mutations_sub.take() {
            self.mutations.unsubscribe(id);
        }

        self.hide_tooltip();
        *self.overlay.borrow_mut() = None;

        let reset = self.treatment.reset_all();
        self.cache.clear();
        self.rule = None;
        self.phase = Phase::Stopped;

        info!(reset, "scanner stopped");
    }

    fn show_tooltip(&mut self, element: ElementId) {
        if self.phase != Phase::Active {
            return;
        }

        let tooltip = {
            let markers = self.markers.borrow();
            let Some(state) = markers.state(element) else {
                return;
            };
            if !state.flagged || (state.name.is_none() && state.reasons.is_empty()) {
                return;
            }
            Tooltip {
                element,
                name: state.name.clone(),
                reasons: state.reasons.clone(),
            }
        };

        if let Some(root) = self.overlay.borrow_mut().as_mut() {
            root.show(tooltip);
        }
    }

    fn hide_tooltip(&self) {
        if let Some(root) = self.overlay.borrow_mut().as_mut() {
            root.hide();
        }
    }
}
