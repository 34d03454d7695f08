//! The document surface the engine drives.
//!
//! Element creation, class toggling, listener bookkeeping and transition-end
//! naming all live on the other side of this trait.

use serde::{Deserialize, Serialize};

use crate::focus::Key;

/// Opaque handle to an element owned by the host document.
pub type NodeId = usize;

/// Handle for a registered listener, returned by [`Dom::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subscription(pub u64);

/// Event names the carousel listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    KeyDown,
    Focus,
    Blur,
    Resize,
    /// End of the styling layer's transition, under whatever name the
    /// browser uses for it.
    TransitionEnd,
}

/// An event delivered to [`crate::Carousel::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    /// Element the listener is attached to.
    pub target: NodeId,
    pub kind: EventKind,
    /// Key for `KeyDown` events.
    pub key: Option<Key>,
}

impl DomEvent {
    pub fn new(target: NodeId, kind: EventKind) -> Self {
        Self {
            target,
            kind,
            key: None,
        }
    }

    pub fn key_down(target: NodeId, key: Key) -> Self {
        Self {
            target,
            kind: EventKind::KeyDown,
            key: Some(key),
        }
    }
}

/// Markup for an element the engine inserts (arrows, pagination holder).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub title: Option<String>,
    pub text: String,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

/// Everything the engine needs from a document.
///
/// Measurements are in CSS pixels. `client_left` may return a non-finite value
/// when layout is unavailable; the engine treats that as a measurement anomaly.
pub trait Dom {
    /// The node resize events are delivered to.
    fn window(&self) -> NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Descendants of `root` carrying any of `classes`, in document order.
    fn query_classes(&self, root: NodeId, classes: &[&str]) -> Vec<NodeId>;

    /// `node` itself or its nearest ancestor carrying `class`.
    fn closest_class(&self, node: NodeId, class: &str) -> Option<NodeId>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Rendered width.
    fn width(&self, node: NodeId) -> f64;

    /// Left edge of the bounding rectangle in viewport coordinates.
    fn client_left(&self, node: NodeId) -> f64;

    /// Left edge relative to the parent's content box.
    fn offset_left(&self, node: NodeId) -> f64;

    fn set_width(&mut self, node: NodeId, px: f64);

    /// Set the horizontal translation of `node`.
    ///
    /// Returns `true` when the styling layer started a transition, in which
    /// case a `TransitionEnd` event will follow. Returns `false` when nothing
    /// will be animated (unchanged value, transitions disabled).
    fn set_translation(&mut self, node: NodeId, px: i32) -> bool;

    fn set_class(&mut self, node: NodeId, class: &str, on: bool);

    /// Replace the text content of `node`.
    fn set_text(&mut self, node: NodeId, text: &str);

    fn focus(&mut self, node: NodeId);

    /// Insert a new element as the first child of `parent`.
    fn insert_first(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId;

    /// Insert a new element directly after `sibling`.
    fn insert_after(&mut self, sibling: NodeId, spec: &ElementSpec) -> NodeId;

    fn remove(&mut self, node: NodeId);

    fn subscribe(&mut self, node: NodeId, kind: EventKind) -> Subscription;

    /// Detach a listener. Unknown or already detached handles are ignored.
    fn unsubscribe(&mut self, subscription: Subscription);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_spec_builder() {
        let spec = ElementSpec::new("a")
            .with_id("anchorRight")
            .with_class("shifters")
            .with_class("shifterRight")
            .with_title("Shift right")
            .with_text("Scroll left");

        assert_eq!(spec.tag, "a");
        assert_eq!(spec.id.as_deref(), Some("anchorRight"));
        assert_eq!(spec.classes, vec!["shifters", "shifterRight"]);
        assert_eq!(spec.title.as_deref(), Some("Shift right"));
        assert_eq!(spec.text, "Scroll left");
    }

    #[test]
    fn test_dom_event_constructors() {
        let click = DomEvent::new(3, EventKind::Click);
        assert_eq!(click.key, None);

        let key = DomEvent::key_down(1, Key::Enter);
        assert_eq!(key.kind, EventKind::KeyDown);
        assert_eq!(key.key, Some(Key::Enter));
    }
}
