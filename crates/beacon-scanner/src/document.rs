//! The document seam.
//!
//! The scanner core never touches a live browser tree. It sees a document
//! through [`DocumentTree`]: stable element handles, CSS-selector queries,
//! attribute reads, attachment state and geometry. [`HtmlDocument`] backs
//! the seam with a parsed HTML tree; geometry and detachment are host-fed
//! side tables, since a parsed tree has no layout.

use scraper::{ElementRef, Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;
use url::Url;

/// Stable, opaque identity of an element within one document.
///
/// Handles are arena indices: the same underlying node always maps to the
/// same id, and ids stay valid after the node leaves the tree (lookups on
/// detached elements simply return nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// An axis-aligned bounding box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rect.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rect grown by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Whether this rect intersects `other`.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Read-only view of a page the scanner operates on.
pub trait DocumentTree {
    /// The page's own URL, used to resolve relative item URLs.
    fn page_url(&self) -> &Url;

    /// Elements matching a CSS selector, in document order, capped at
    /// `cap` to bound worst-case cost on pathological pages.
    fn select(&self, selector: &str, cap: usize) -> Vec<ElementId>;

    /// The first descendant of `element` matching a CSS selector.
    fn select_within(&self, element: ElementId, selector: &str) -> Option<ElementId>;

    /// An attribute value of `element`.
    fn attr(&self, element: ElementId, name: &str) -> Option<String>;

    /// Whether `element` is still part of the document.
    fn is_attached(&self, element: ElementId) -> bool;

    /// The element's bounding box, when the host tracks layout.
    fn bounding_box(&self, element: ElementId) -> Option<Rect>;

    /// The currently visible scrolled region.
    fn viewport(&self) -> Rect;
}

/// Default viewport for documents whose host supplied none.
const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1280.0,
    height: 720.0,
};

/// A [`DocumentTree`] over a parsed HTML document.
///
/// Selector queries run against the parsed tree; geometry, viewport and
/// detachment are side tables the host updates as it learns about layout.
/// Elements with no recorded geometry report a minimal in-view box, so
/// hosts that do not track layout still get their items scanned.
pub struct HtmlDocument {
    html: Html,
    url: Url,
    arena: RefCell<HashMap<ego_tree::NodeId, ElementId>>,
    nodes: RefCell<Vec<ego_tree::NodeId>>,
    geometry: RefCell<HashMap<ElementId, Rect>>,
    detached: RefCell<HashSet<ElementId>>,
    viewport: Cell<Rect>,
}

impl HtmlDocument {
    /// Parse an HTML document located at `url`.
    #[must_use]
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(html),
            url,
            arena: RefCell::new(HashMap::new()),
            nodes: RefCell::new(Vec::new()),
            geometry: RefCell::new(HashMap::new()),
            detached: RefCell::new(HashSet::new()),
            viewport: Cell::new(DEFAULT_VIEWPORT),
        }
    }

    /// Set the visible viewport.
    pub fn set_viewport(&self, viewport: Rect) {
        self.viewport.set(viewport);
    }

    /// Record an element's bounding box.
    pub fn set_bounding_box(&self, element: ElementId, rect: Rect) {
        self.geometry.borrow_mut().insert(element, rect);
    }

    /// Mark an element as removed from the document.
    pub fn detach(&self, element: ElementId) {
        self.detached.borrow_mut().insert(element);
    }

    fn intern(&self, node_id: ego_tree::NodeId) -> ElementId {
        let mut arena = self.arena.borrow_mut();
        if let Some(id) = arena.get(&node_id) {
            return *id;
        }
        let mut nodes = self.nodes.borrow_mut();
        let id = ElementId(nodes.len());
        nodes.push(node_id);
        arena.insert(node_id, id);
        id
    }

    fn element_ref(&self, element: ElementId) -> Option<ElementRef<'_>> {
        let node_id = *self.nodes.borrow().get(element.0)?;
        self.html.tree.get(node_id).and_then(ElementRef::wrap)
    }

    fn parse_selector(&self, selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                warn!(selector, %error, "unparsable CSS selector");
                None
            }
        }
    }
}

impl DocumentTree for HtmlDocument {
    fn page_url(&self) -> &Url {
        &self.url
    }

    fn select(&self, selector: &str, cap: usize) -> Vec<ElementId> {
        let Some(parsed) = self.parse_selector(selector) else {
            return Vec::new();
        };

        self.html
            .select(&parsed)
            .take(cap)
            .map(|element| self.intern(element.id()))
            .filter(|id| !self.detached.borrow().contains(id))
            .collect()
    }

    fn select_within(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let parsed = self.parse_selector(selector)?;
        let scope = self.element_ref(element)?;
        scope
            .select(&parsed)
            .next()
            .map(|found| self.intern(found.id()))
    }

    fn attr(&self, element: ElementId, name: &str) -> Option<String> {
        self.element_ref(element)?
            .value()
            .attr(name)
            .map(ToString::to_string)
    }

    fn is_attached(&self, element: ElementId) -> bool {
        !self.detached.borrow().contains(&element)
            && self.nodes.borrow().len() > element.0
    }

    fn bounding_box(&self, element: ElementId) -> Option<Rect> {
        if !self.is_attached(element) {
            return None;
        }
        let viewport = self.viewport.get();
        Some(
            self.geometry
                .borrow()
                .get(&element)
                .copied()
                .unwrap_or(Rect::new(viewport.x, viewport.y, 1.0, 1.0)),
        )
    }

    fn viewport(&self) -> Rect {
        self.viewport.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> HtmlDocument {
        HtmlDocument::parse(
            html,
            Url::parse("https://page.example/search").expect("valid page URL"),
        )
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        let c = Rect::new(500.0, 500.0, 10.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));

        // Expansion pulls distant rects into range
        assert!(a.expand(450.0).intersects(&c));
    }

    #[test]
    fn test_select_returns_stable_ids() {
        let doc = doc(r#"<div class="item">a</div><div class="item">b</div>"#);

        let first = doc.select(".item", 10);
        let second = doc.select(".item", 10);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_respects_cap() {
        let doc = doc(r#"<p>1</p><p>2</p><p>3</p><p>4</p>"#);
        assert_eq!(doc.select("p", 2).len(), 2);
    }

    #[test]
    fn test_select_within_and_attr() {
        let doc = doc(
            r#"<div class="card"><a class="link" href="/x">x</a></div>
               <div class="card"><span>no link</span></div>"#,
        );

        let cards = doc.select(".card", 10);
        assert_eq!(cards.len(), 2);

        let link = doc
            .select_within(cards[0], "a.link")
            .expect("first card has a link");
        assert_eq!(doc.attr(link, "href"), Some("/x".to_string()));
        assert_eq!(doc.attr(link, "data-missing"), None);

        assert!(doc.select_within(cards[1], "a.link").is_none());
    }

    #[test]
    fn test_invalid_selector_yields_nothing() {
        let doc = doc("<div>x</div>");
        assert!(doc.select("][not-a-selector", 10).is_empty());
    }

    #[test]
    fn test_detach_hides_element() {
        let doc = doc(r#"<div class="item">a</div>"#);
        let items = doc.select(".item", 10);
        let item = items[0];

        assert!(doc.is_attached(item));
        assert!(doc.bounding_box(item).is_some());

        doc.detach(item);
        assert!(!doc.is_attached(item));
        assert!(doc.bounding_box(item).is_none());
        assert!(doc.select(".item", 10).is_empty());
    }

    #[test]
    fn test_geometry_side_table() {
        let doc = doc(r#"<div class="item">a</div>"#);
        let item = doc.select(".item", 10)[0];

        // Unset geometry reports a minimal in-view box
        let viewport = doc.viewport();
        let rect = doc.bounding_box(item).expect("default box");
        assert!(viewport.intersects(&rect));

        doc.set_bounding_box(item, Rect::new(0.0, 5000.0, 100.0, 40.0));
        let rect = doc.bounding_box(item).expect("recorded box");
        assert!(!viewport.intersects(&rect));
    }
}
