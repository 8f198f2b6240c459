//! End-to-end scanner tests over a parsed page and an in-process
//! classification transport.

use async_trait::async_trait;
use beacon_classifier::{Classifier, MessageHandler};
use beacon_core::{Classification, ClassificationTransport, FieldKey};
use beacon_dataset::DatasetLoader;
use beacon_rules::{RuleRegistry, ScanRule, ScanRuleRegistry};
use beacon_scanner::{
    DocumentTree, ElementId, EventBus, HtmlDocument, PageEvent, Phase, Rect, ScannerConfig,
    ScannerController,
};
use beacon_store::MemoryStore;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const PAGE_URL: &str = "https://jobs.example/search";

const PAGE_HTML: &str = r#"
    <div class="results">
        <div class="job-card"><a class="company" href="https://www.linkedin.com/company/acme">Acme</a></div>
        <div class="job-card"><a class="company" href="/company/safeco">SafeCo</a></div>
        <div class="job-card"><span>missing link</span></div>
        <div class="job-card"><a class="company" href="/company/dyne">Dyne</a></div>
    </div>
"#;

/// Transport wrapper recording classification calls, optionally delaying
/// them to hold a drain in flight.
struct RecordingTransport {
    inner: MessageHandler,
    delay: Duration,
    calls: Rc<RefCell<Vec<String>>>,
}

#[async_trait(?Send)]
impl ClassificationTransport for RecordingTransport {
    async fn test_url(&self, url: &str) -> beacon_core::Result<Classification> {
        self.calls.borrow_mut().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.test_url(url).await
    }

    async fn dismiss_url(&self, key: FieldKey, selector: &str) -> beacon_core::Result<bool> {
        self.inner.dismiss_url(key, selector).await
    }
}

struct Fixture {
    controller: ScannerController<HtmlDocument>,
    document: Rc<HtmlDocument>,
    visibility: Rc<EventBus<ElementId>>,
    mutations: Rc<EventBus<Vec<ElementId>>>,
    store: Arc<MemoryStore>,
    calls: Rc<RefCell<Vec<String>>>,
}

fn fixture_with(html: &str, config: ScannerConfig, transport_delay: Duration) -> Fixture {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("beacon=debug")
        .try_init();

    let dataset = DatasetLoader::from_str(
        r#"[{"id": "1", "n": "Acme", "r": ["h"], "li": "acme"}]"#,
    )
    .expect("parse fixture dataset");

    let store = Arc::new(MemoryStore::new());
    let classifier = Classifier::new(
        Arc::new(RuleRegistry::builtin()),
        Arc::new(dataset),
        store.clone(),
    );
    let handler = MessageHandler::new(classifier, store.clone());

    let calls = Rc::new(RefCell::new(Vec::new()));
    let transport = Rc::new(RecordingTransport {
        inner: handler,
        delay: transport_delay,
        calls: calls.clone(),
    });

    let document = Rc::new(HtmlDocument::parse(
        html,
        Url::parse(PAGE_URL).expect("valid page URL"),
    ));

    let scan_rules = Arc::new(ScanRuleRegistry::new(vec![ScanRule::new(
        r"^https://jobs\.example/search",
        ".job-card",
        "a.company",
    )
    .expect("valid scan rule")]));

    let visibility = Rc::new(EventBus::new());
    let mutations = Rc::new(EventBus::new());

    let controller = ScannerController::new(
        config,
        scan_rules,
        document.clone(),
        transport,
        visibility.clone(),
        mutations.clone(),
    );

    Fixture {
        controller,
        document,
        visibility,
        mutations,
        store,
        calls,
    }
}

fn fixture() -> Fixture {
    fixture_with(PAGE_HTML, ScannerConfig::default(), Duration::ZERO)
}

fn navigated() -> PageEvent {
    PageEvent::Navigated {
        url: PAGE_URL.to_string(),
    }
}

fn place_all_out_of_view(fixture: &Fixture) -> Vec<ElementId> {
    let cards = fixture.document.select(".job-card", 10);
    for card in &cards {
        fixture
            .document
            .set_bounding_box(*card, Rect::new(0.0, 10_000.0, 600.0, 80.0));
    }
    cards
}

#[tokio::test(start_paused = true)]
async fn initial_scan_classifies_visible_items() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let overlay = fx.controller.overlay();
    let cards = fx.document.select(".job-card", 10);

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_secs(5)).await;

        {
            let markers = markers.borrow();

            // Flagged item: overlay, stored tooltip data, processed
            let flagged = markers.state(cards[0]).expect("flagged state");
            assert!(flagged.flagged && flagged.processed);
            assert!(flagged.overlay.is_some());
            assert_eq!(flagged.name.as_deref(), Some("Acme"));
            assert_eq!(
                flagged.matched.as_ref().map(|m| m.key),
                Some(FieldKey::LinkedIn)
            );

            // Safe items: passed + processed, no overlay
            for safe in [cards[1], cards[3]] {
                let state = markers.state(safe).expect("safe state");
                assert!(state.passed && state.processed && !state.flagged);
                assert!(state.overlay.is_none());
            }

            // Link-less container: processed terminally, no treatment
            let linkless = markers.state(cards[2]).expect("linkless state");
            assert!(linkless.processed && !linkless.flagged && !linkless.passed);
        }

        // Hover round trip against the stored element data
        sender
            .send(PageEvent::PointerEnter(cards[0]))
            .expect("send pointer enter");
        tokio::time::sleep(Duration::from_millis(10)).await;
        {
            let overlay = overlay.borrow();
            let tooltip = overlay
                .as_ref()
                .expect("overlay root present")
                .tooltip()
                .expect("tooltip visible");
            assert_eq!(tooltip.name.as_deref(), Some("Acme"));
        }
        sender
            .send(PageEvent::PointerLeave(cards[0]))
            .expect("send pointer leave");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(overlay
            .borrow()
            .as_ref()
            .expect("overlay root present")
            .tooltip()
            .is_none());

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);

    // Stop reset every marker and removed the overlay root
    assert_eq!(fx.controller.phase(), Phase::Stopped);
    assert!(fx.controller.markers().borrow().marked_elements().is_empty());
    assert!(fx.controller.overlay().borrow().is_none());
    assert_eq!(fx.visibility.subscriber_count(), 0);
    assert_eq!(fx.mutations.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn visibility_events_are_debounced() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = place_all_out_of_view(&fx);
    let document = fx.document.clone();
    let visibility = fx.visibility.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        // Past the settle delay; nothing was visible at activation
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(visibility.subscriber_count(), 1);
        assert!(markers.borrow().marked_elements().is_empty());

        // First card scrolls into view
        document.set_bounding_box(cards[0], Rect::new(0.0, 100.0, 600.0, 80.0));
        visibility.publish(&cards[0]);

        // Debounce window not yet elapsed
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!markers.borrow().is_processed(cards[0]));

        // Flush + drain complete after the debounce delay
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let state = markers.borrow().state(cards[0]).cloned().expect("state");
        assert!(state.processed && state.flagged);

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
    assert_eq!(fx.visibility.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn mutation_added_elements_are_scanned() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = place_all_out_of_view(&fx);
    let document = fx.document.clone();
    let mutations = fx.mutations.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // The host reports two cards added by a structural mutation
        document.set_bounding_box(cards[1], Rect::new(0.0, 200.0, 600.0, 80.0));
        document.set_bounding_box(cards[3], Rect::new(0.0, 300.0, 600.0, 80.0));
        mutations.publish(&vec![cards[1], cards[3]]);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let markers = markers.borrow();
        assert!(markers.state(cards[1]).expect("state").passed);
        assert!(markers.state(cards[3]).expect("state").passed);

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
}

#[tokio::test(start_paused = true)]
async fn out_of_view_elements_wait_for_a_later_flush() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = place_all_out_of_view(&fx);
    let document = fx.document.clone();
    let visibility = fx.visibility.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // Queued while still far outside the expanded viewport
        visibility.publish(&cards[1]);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!markers.borrow().is_processed(cards[1]));

        // Scrolls into view; a later queue addition triggers the flush
        // that picks the deferred element back up
        document.set_bounding_box(cards[1], Rect::new(0.0, 150.0, 600.0, 80.0));
        document.set_bounding_box(cards[2], Rect::new(0.0, 250.0, 600.0, 80.0));
        visibility.publish(&cards[2]);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let markers = markers.borrow();
        assert!(markers.state(cards[1]).expect("state").passed);
        // The link-less card was processed terminally by the same flush
        assert!(markers.is_processed(cards[2]));

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
}

#[tokio::test(start_paused = true)]
async fn detached_elements_are_dropped() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = place_all_out_of_view(&fx);
    let document = fx.document.clone();
    let visibility = fx.visibility.clone();
    let calls = fx.calls.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        document.set_bounding_box(cards[0], Rect::new(0.0, 100.0, 600.0, 80.0));
        visibility.publish(&cards[0]);
        // Removed from the document before the flush fires
        document.detach(cards[0]);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(markers.borrow().state(cards[0]).is_none());
        assert!(calls.borrow().is_empty());

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
}

#[tokio::test(start_paused = true)]
async fn drains_never_overlap_or_lose_items() {
    // Slow transport and a long inter-item delay hold the first drain in
    // flight while more work arrives
    let config = ScannerConfig {
        check_delay: Duration::from_secs(2),
        ..ScannerConfig::default()
    };
    let mut fx = fixture_with(PAGE_HTML, config, Duration::from_secs(1));
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = place_all_out_of_view(&fx);
    let document = fx.document.clone();
    let visibility = fx.visibility.clone();
    let calls = fx.calls.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_millis(1100)).await;

        // Two items discovered; the drain starts working through them
        document.set_bounding_box(cards[0], Rect::new(0.0, 100.0, 600.0, 80.0));
        document.set_bounding_box(cards[1], Rect::new(0.0, 200.0, 600.0, 80.0));
        visibility.publish(&cards[0]);
        visibility.publish(&cards[1]);

        // While the drain is mid-flight, a third item is discovered twice
        tokio::time::sleep(Duration::from_millis(2500)).await;
        document.set_bounding_box(cards[3], Rect::new(0.0, 300.0, 600.0, 80.0));
        visibility.publish(&cards[3]);
        visibility.publish(&cards[3]);

        tokio::time::sleep(Duration::from_secs(15)).await;

        let markers = markers.borrow();
        for card in [cards[0], cards[1], cards[3]] {
            assert!(markers.is_processed(card), "{card} must be processed");
        }

        // Every URL classified exactly once: no double processing, no
        // permanently skipped items
        let calls = calls.borrow();
        assert_eq!(calls.len(), 3);
        let mut sorted = calls.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
}

#[tokio::test(start_paused = true)]
async fn repeated_urls_hit_the_cache() {
    let html = r#"
        <div class="job-card"><a class="company" href="https://linkedin.com/company/acme">Acme</a></div>
        <div class="job-card"><a class="company" href="https://linkedin.com/company/acme">Acme again</a></div>
    "#;
    let mut fx = fixture_with(html, ScannerConfig::default(), Duration::ZERO);
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = fx.document.select(".job-card", 10);
    let calls = fx.calls.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_secs(5)).await;

        // One transport round trip; both elements treated
        assert_eq!(calls.borrow().len(), 1);
        let markers = markers.borrow();
        assert!(markers.state(cards[0]).expect("state").flagged);
        assert!(markers.state(cards[1]).expect("state").flagged);

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
}

#[tokio::test(start_paused = true)]
async fn dismissal_removes_treatment_and_persists() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = fx.document.select(".job-card", 10);
    let store = fx.store.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(markers.borrow().state(cards[0]).expect("state").flagged);

        sender
            .send(PageEvent::DismissRequested(cards[0]))
            .expect("send dismiss");
        tokio::time::sleep(Duration::from_millis(10)).await;

        let state = markers.borrow().state(cards[0]).cloned().expect("state");
        assert!(!state.flagged && state.processed);
        assert!(state.overlay.is_none());
        assert!(store.dismissed_at("li_acme").is_some());

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
}

#[tokio::test(start_paused = true)]
async fn navigation_away_stops_and_back_restarts() {
    let mut fx = fixture();
    let sender = fx.controller.sender();
    let markers = fx.controller.markers();
    let cards = fx.document.select(".job-card", 10);
    let visibility = fx.visibility.clone();
    let calls = fx.calls.clone();

    let driver = async {
        sender.send(navigated()).expect("send navigation");
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(markers.borrow().state(cards[0]).expect("state").flagged);
        let first_pass_calls = calls.borrow().len();

        // Navigating to a page with no scan rule tears everything down
        sender
            .send(PageEvent::Navigated {
                url: "https://jobs.example/profile/me".to_string(),
            })
            .expect("send navigation away");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(markers.borrow().marked_elements().is_empty());
        assert_eq!(visibility.subscriber_count(), 0);

        // A fresh matching navigation re-initializes from Stopped and the
        // cleared cache forces re-classification
        sender.send(navigated()).expect("send navigation back");
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(markers.borrow().state(cards[0]).expect("state").flagged);
        assert!(calls.borrow().len() > first_pass_calls);

        sender.send(PageEvent::Shutdown).expect("send shutdown");
    };

    tokio::join!(fx.controller.run(), driver);
    assert_eq!(fx.controller.phase(), Phase::Stopped);
}
