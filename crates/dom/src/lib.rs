//! Carousel Headless Document
//!
//! An in-memory document the carousel engine can measure and mutate.
//!
//! This crate handles:
//! - Element tree with ids, classes, text and focus
//! - Box geometry (left edge, width, horizontal translation)
//! - Listener registration with idempotent removal
//! - Tracking of started transitions until the host completes them

mod page;

use std::collections::BTreeMap;

use carousel_core::{Dom, ElementSpec, EventKind, NodeId, Subscription};
use thiserror::Error;

pub use page::PageFixture;

/// Errors that can occur while building a document.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Element id '{0}' is already in use")]
    DuplicateId(String),

    #[error("Element {0} does not exist")]
    UnknownElement(NodeId),
}

/// A single element in the tree.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub title: Option<String>,
    pub text: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Left edge relative to the parent's content box.
    pub left: f64,
    pub width: f64,
    /// Horizontal translation applied on top of `left`.
    pub translation: i32,
    /// Removed from the tree.
    pub detached: bool,
}

/// A registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub node: NodeId,
    pub kind: EventKind,
}

/// The headless document.
///
/// Node 0 is the window, which receives resize events; node 1 is the body.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    listeners: BTreeMap<Subscription, Listener>,
    next_subscription: u64,
    active: Option<NodeId>,
    transitions_enabled: bool,
    pending_transitions: Vec<NodeId>,
    geometry_valid: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const WINDOW: NodeId = 0;
    pub const BODY: NodeId = 1;

    /// Create an empty document with transitions enabled.
    pub fn new() -> Self {
        let window = Element {
            tag: "window".to_string(),
            ..Default::default()
        };
        let body = Element {
            tag: "body".to_string(),
            parent: Some(Self::WINDOW),
            ..Default::default()
        };

        Self {
            nodes: vec![window, body],
            listeners: BTreeMap::new(),
            next_subscription: 1,
            active: None,
            transitions_enabled: true,
            pending_transitions: Vec::new(),
            geometry_valid: true,
        }
    }

    /// Append a new element under `parent` at `left` with `width`.
    pub fn create_element(
        &mut self,
        parent: NodeId,
        spec: &ElementSpec,
        left: f64,
        width: f64,
    ) -> Result<NodeId, DomError> {
        self.check_live(parent)?;
        if let Some(id) = &spec.id {
            if self.element_by_id_str(id).is_some() {
                return Err(DomError::DuplicateId(id.clone()));
            }
        }

        let node = self.push(parent, spec);
        self.nodes[node].left = left;
        self.nodes[node].width = width;
        self.nodes[parent].children.push(node);
        Ok(node)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node).filter(|e| !e.detached)
    }

    /// Current classes of `node`.
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(node)
            .map(|e| e.classes.as_slice())
            .unwrap_or(&[])
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(node).map_or("", |e| e.text.as_str())
    }

    pub fn translation(&self, node: NodeId) -> i32 {
        self.nodes.get(node).map_or(0, |e| e.translation)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Change the rendered width of `node`, as a browser resize would.
    pub fn resize_element(&mut self, node: NodeId, width: f64) -> Result<(), DomError> {
        self.check_live(node)?;
        self.nodes[node].width = width;
        Ok(())
    }

    /// Whether translation changes start a visual transition.
    pub fn set_transitions_enabled(&mut self, enabled: bool) {
        self.transitions_enabled = enabled;
    }

    /// Make every geometry read return NaN, as when layout is unavailable.
    pub fn set_geometry_valid(&mut self, valid: bool) {
        self.geometry_valid = valid;
    }

    /// Nodes whose transition started and has not been completed yet.
    pub fn take_pending_transitions(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.pending_transitions)
    }

    pub fn has_pending_transitions(&self) -> bool {
        !self.pending_transitions.is_empty()
    }

    /// Live listeners attached to `node` for `kind`.
    pub fn listeners_for(&self, node: NodeId, kind: EventKind) -> Vec<Subscription> {
        self.listeners
            .iter()
            .filter(|(_, l)| l.node == node && l.kind == kind)
            .map(|(&s, _)| s)
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_subscribed(&self, subscription: Subscription) -> bool {
        self.listeners.contains_key(&subscription)
    }

    fn push(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        self.nodes.push(Element {
            tag: spec.tag.clone(),
            id: spec.id.clone(),
            classes: spec.classes.clone(),
            title: spec.title.clone(),
            text: spec.text.clone(),
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes.len() - 1
    }

    /// Resolve an id for an inserted element, dropping it when already taken.
    fn unique_spec(&self, spec: &ElementSpec) -> ElementSpec {
        let mut spec = spec.clone();
        if let Some(id) = &spec.id {
            if self.element_by_id_str(id).is_some() {
                tracing::warn!("Element id '{}' already in use, inserting without id", id);
                spec.id = None;
            }
        }
        spec
    }

    fn check_live(&self, node: NodeId) -> Result<(), DomError> {
        match self.nodes.get(node) {
            Some(e) if !e.detached => Ok(()),
            _ => Err(DomError::UnknownElement(node)),
        }
    }

    fn element_by_id_str(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|e| !e.detached && e.id.as_deref() == Some(id))
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[node].children {
            if self.nodes[child].detached {
                continue;
            }
            out.push(child);
            self.collect_descendants(child, out);
        }
    }
}

impl Dom for Document {
    fn window(&self) -> NodeId {
        Self::WINDOW
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.element_by_id_str(id)
    }

    fn query_classes(&self, root: NodeId, classes: &[&str]) -> Vec<NodeId> {
        if self.check_live(root).is_err() {
            return Vec::new();
        }
        let mut descendants = Vec::new();
        self.collect_descendants(root, &mut descendants);
        descendants
            .into_iter()
            .filter(|&n| classes.iter().any(|c| self.has_class(n, c)))
            .collect()
    }

    fn closest_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.has_class(n, class) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|e| e.parent)
    }

    fn width(&self, node: NodeId) -> f64 {
        if !self.geometry_valid {
            return f64::NAN;
        }
        self.nodes.get(node).map_or(0.0, |e| e.width)
    }

    fn client_left(&self, node: NodeId) -> f64 {
        if !self.geometry_valid {
            return f64::NAN;
        }
        let mut left = 0.0;
        let mut current = Some(node);
        while let Some(n) = current {
            let Some(e) = self.nodes.get(n) else {
                break;
            };
            left += e.left + e.translation as f64;
            current = e.parent;
        }
        left
    }

    fn offset_left(&self, node: NodeId) -> f64 {
        if !self.geometry_valid {
            return f64::NAN;
        }
        self.nodes.get(node).map_or(0.0, |e| e.left)
    }

    fn set_width(&mut self, node: NodeId, px: f64) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.width = px;
        }
    }

    fn set_translation(&mut self, node: NodeId, px: i32) -> bool {
        let Some(e) = self.nodes.get_mut(node) else {
            return false;
        };
        if e.translation == px {
            return false;
        }
        e.translation = px;

        if self.transitions_enabled {
            if !self.pending_transitions.contains(&node) {
                self.pending_transitions.push(node);
            }
            true
        } else {
            false
        }
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        let Some(e) = self.nodes.get_mut(node) else {
            return;
        };
        let present = e.classes.iter().any(|c| c == class);
        if on && !present {
            e.classes.push(class.to_string());
        } else if !on && present {
            e.classes.retain(|c| c != class);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.text = text.to_string();
        }
    }

    fn focus(&mut self, node: NodeId) {
        if self.check_live(node).is_ok() {
            self.active = Some(node);
        }
    }

    fn insert_first(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let spec = self.unique_spec(spec);
        let node = self.push(parent, &spec);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.insert(0, node);
        }
        node
    }

    fn insert_after(&mut self, sibling: NodeId, spec: &ElementSpec) -> NodeId {
        let parent = self.parent(sibling).unwrap_or(Self::BODY);
        let spec = self.unique_spec(spec);
        let node = self.push(parent, &spec);
        let children = &mut self.nodes[parent].children;
        let at = children
            .iter()
            .position(|&c| c == sibling)
            .map_or(children.len(), |i| i + 1);
        children.insert(at, node);
        node
    }

    fn remove(&mut self, node: NodeId) {
        if node <= Self::BODY || self.check_live(node).is_err() {
            return;
        }
        if let Some(parent) = self.nodes[node].parent {
            self.nodes[parent].children.retain(|&c| c != node);
        }
        self.nodes[node].detached = true;
        if self.active == Some(node) {
            self.active = None;
        }
    }

    fn subscribe(&mut self, node: NodeId, kind: EventKind) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.insert(subscription, Listener { node, kind });
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.remove(&subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_fixture() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let wrapper = doc
            .create_element(
                Document::BODY,
                &ElementSpec::new("div").with_id("wrap"),
                40.0,
                935.0,
            )
            .unwrap();
        let content = doc
            .create_element(wrapper, &ElementSpec::new("ul").with_id("list"), 0.0, 0.0)
            .unwrap();
        (doc, wrapper, content)
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let (mut doc, wrapper, _) = list_fixture();
        let err = doc
            .create_element(wrapper, &ElementSpec::new("div").with_id("wrap"), 0.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, DomError::DuplicateId(id) if id == "wrap"));
    }

    #[test]
    fn test_client_left_includes_translation() {
        let (mut doc, wrapper, content) = list_fixture();
        assert_eq!(doc.client_left(wrapper), 40.0);
        assert_eq!(doc.client_left(content), 40.0);

        assert!(doc.set_translation(content, -237));
        assert_eq!(doc.client_left(content), -197.0);
        assert_eq!(doc.take_pending_transitions(), vec![content]);
    }

    #[test]
    fn test_unchanged_translation_does_not_transition() {
        let (mut doc, _, content) = list_fixture();
        assert!(!doc.set_translation(content, 0));
        assert!(!doc.has_pending_transitions());

        doc.set_transitions_enabled(false);
        assert!(!doc.set_translation(content, -100));
        assert_eq!(doc.translation(content), -100);
        assert!(!doc.has_pending_transitions());
    }

    #[test]
    fn test_query_classes_document_order() {
        let (mut doc, _, content) = list_fixture();
        let a = doc
            .create_element(content, &ElementSpec::new("li").with_class("gridItem"), 0.0, 224.0)
            .unwrap();
        let a_link = doc
            .create_element(a, &ElementSpec::new("a").with_class("link"), 0.0, 0.0)
            .unwrap();
        let b = doc
            .create_element(content, &ElementSpec::new("li").with_class("gridItem"), 237.0, 224.0)
            .unwrap();
        let b_input = doc
            .create_element(b, &ElementSpec::new("input").with_class("input-text"), 0.0, 0.0)
            .unwrap();

        assert_eq!(doc.query_classes(content, &["gridItem"]), vec![a, b]);
        assert_eq!(doc.query_classes(content, &["input-text", "link"]), vec![a_link, b_input]);
        assert_eq!(doc.closest_class(b_input, "gridItem"), Some(b));
        assert_eq!(doc.closest_class(b_input, "missing"), None);
    }

    #[test]
    fn test_insert_first_and_after() {
        let (mut doc, wrapper, content) = list_fixture();
        let right = doc.insert_first(wrapper, &ElementSpec::new("a").with_id("anchorRight"));
        let left = doc.insert_first(wrapper, &ElementSpec::new("a"));
        let holder = doc.insert_after(left, &ElementSpec::new("span").with_text("0 of 0"));

        assert_eq!(doc.children(wrapper), &[left, holder, right, content]);
        assert_eq!(doc.element_by_id("anchorRight"), Some(right));
        assert_eq!(doc.text(holder), "0 of 0");
    }

    #[test]
    fn test_insert_with_taken_id_drops_id() {
        let (mut doc, wrapper, _) = list_fixture();
        let node = doc.insert_first(wrapper, &ElementSpec::new("a").with_id("wrap"));
        assert_eq!(doc.element(node).and_then(|e| e.id.clone()), None);
        assert_eq!(doc.element_by_id("wrap"), Some(wrapper));
    }

    #[test]
    fn test_set_class_toggles_once() {
        let (mut doc, wrapper, _) = list_fixture();
        doc.set_class(wrapper, "shifterOff", true);
        doc.set_class(wrapper, "shifterOff", true);
        assert_eq!(doc.classes(wrapper), &["shifterOff".to_string()]);
        doc.set_class(wrapper, "shifterOff", false);
        assert!(doc.classes(wrapper).is_empty());
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let (mut doc, wrapper, _) = list_fixture();
        let sub = doc.subscribe(wrapper, EventKind::Focus);
        assert!(doc.is_subscribed(sub));
        assert_eq!(doc.listeners_for(wrapper, EventKind::Focus), vec![sub]);

        doc.unsubscribe(sub);
        doc.unsubscribe(sub);
        doc.unsubscribe(Subscription(999));
        assert!(!doc.is_subscribed(sub));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_remove_detaches() {
        let (mut doc, wrapper, _) = list_fixture();
        let arrow = doc.insert_first(wrapper, &ElementSpec::new("a").with_id("anchorRight"));
        doc.focus(arrow);
        doc.remove(arrow);

        assert!(doc.element(arrow).is_none());
        assert_eq!(doc.element_by_id("anchorRight"), None);
        assert_eq!(doc.active_element(), None);
        assert!(!doc.children(wrapper).contains(&arrow));
    }

    #[test]
    fn test_invalid_geometry_reads_nan() {
        let (mut doc, wrapper, _) = list_fixture();
        doc.set_geometry_valid(false);
        assert!(doc.client_left(wrapper).is_nan());
        assert!(doc.width(wrapper).is_nan());
        doc.set_geometry_valid(true);
        assert_eq!(doc.width(wrapper), 935.0);
    }
}
