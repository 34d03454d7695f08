//! Carousel instance: lifecycle, navigation and event routing.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::dom::{Dom, DomEvent, ElementSpec, EventKind, NodeId, Subscription};
use crate::focus::{FocusState, Key, KeyAction};
use crate::layout::LayoutModel;
use crate::pagination::Pagination;
use crate::position::{measure_offset, PositionState};
use crate::{ArrowSide, CarouselError, Direction};

/// Class shared by both arrow controls.
pub const ARROW_CLASS: &str = "shifters";
/// Extra class carried by the right arrow.
pub const RIGHT_ARROW_CLASS: &str = "shifterRight";
/// Disabled-state class toggled on either arrow.
pub const DISABLED_CLASS: &str = "shifterOff";
/// Class of the pagination indicator.
pub const PAGINATION_CLASS: &str = "paginationHolder";

/// Options for mounting a carousel. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselOptions {
    /// Id of the wrapper (viewport) element.
    pub wrapper_id: String,
    /// Id of the content element holding the items.
    pub content_target_id: String,
    /// Nominal item width, used for index rounding only.
    pub item_width: i32,
    /// Margin added to the wrapper width to get the jump distance.
    pub margin_gap: i32,
    /// Class marking the navigable items.
    pub item_class: String,
    /// Class on the parent of a control that recentres the strip on focus.
    pub expandable_class: String,
    /// Class of text inputs; Enter focuses the first one.
    pub text_input_class: String,
    /// Class of links inside items.
    pub link_class: String,
    /// Id given to the right arrow.
    pub right_arrow_id: String,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            wrapper_id: "temp".to_string(),
            content_target_id: "temp2".to_string(),
            item_width: 237,
            margin_gap: 13,
            item_class: "gridItem".to_string(),
            expandable_class: "contractLink".to_string(),
            text_input_class: "input-text".to_string(),
            link_class: "link".to_string(),
            right_arrow_id: "anchorRight".to_string(),
        }
    }
}

/// Point-in-time view of a carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub offset: i32,
    pub current_page: i32,
    pub page_count: i32,
    pub left_enabled: bool,
    pub right_enabled: bool,
    pub busy: bool,
    pub focus: FocusState,
    pub pagination_text: String,
    pub item_count: usize,
    pub jump_distance: i32,
    pub end_stop: i32,
}

/// A mounted carousel.
///
/// Owns its layout, position, pagination, focus state and every listener it
/// registered. Nothing is shared between instances.
#[derive(Debug)]
pub struct Carousel {
    options: CarouselOptions,
    wrapper: NodeId,
    content: NodeId,
    left_arrow: NodeId,
    right_arrow: NodeId,
    pagination_holder: NodeId,
    controls: Vec<NodeId>,
    layout: LayoutModel,
    position: PositionState,
    pagination: Pagination,
    focus: FocusState,
    /// True from the start of a jump until its transition completes.
    busy: bool,
    listeners: Vec<(NodeId, EventKind, Subscription)>,
    /// One-shot registration for the pending transition, if any.
    transition_end: Option<Subscription>,
}

impl Carousel {
    /// Mount a carousel on the elements named by `options`.
    ///
    /// Inserts the arrows and the pagination indicator, measures the items,
    /// attaches listeners and renders the first page. When either element is
    /// missing nothing is inserted or attached and the list stays static.
    pub fn mount<D: Dom>(dom: &mut D, options: CarouselOptions) -> Result<Self, CarouselError> {
        let wrapper = dom.element_by_id(&options.wrapper_id);
        let content = dom.element_by_id(&options.content_target_id);

        let (wrapper, content) = match (wrapper, content) {
            (Some(wrapper), Some(content)) => (wrapper, content),
            (None, _) => {
                error!("Wrapper element '{}' not found, carousel disabled", options.wrapper_id);
                return Err(CarouselError::WrapperNotFound(options.wrapper_id));
            }
            (_, None) => {
                error!(
                    "Content element '{}' not found, carousel disabled",
                    options.content_target_id
                );
                return Err(CarouselError::ContentNotFound(options.content_target_id));
            }
        };

        let right_arrow = dom.insert_first(
            wrapper,
            &ElementSpec::new("a")
                .with_id(&options.right_arrow_id)
                .with_class(ARROW_CLASS)
                .with_class(RIGHT_ARROW_CLASS)
                .with_title("Shift right")
                .with_text("Scroll left"),
        );
        let left_arrow = dom.insert_first(
            wrapper,
            &ElementSpec::new("a")
                .with_class(ARROW_CLASS)
                .with_class(DISABLED_CLASS)
                .with_title("Shift left")
                .with_text("Scroll right"),
        );
        let pagination_holder = dom.insert_after(
            left_arrow,
            &ElementSpec::new("span")
                .with_class(PAGINATION_CLASS)
                .with_text("0 of 0"),
        );

        let items = dom.query_classes(content, &[options.item_class.as_str()]);
        let content_width = items.len() as i32 * options.item_width;
        dom.set_width(content, content_width as f64);

        let layout =
            LayoutModel::measure(dom, wrapper, items, options.item_width, options.margin_gap);
        let controls = dom.query_classes(
            content,
            &[options.text_input_class.as_str(), options.link_class.as_str()],
        );

        let mut carousel = Self {
            options,
            wrapper,
            content,
            left_arrow,
            right_arrow,
            pagination_holder,
            controls,
            layout,
            position: PositionState::new(),
            pagination: Pagination::new(),
            focus: FocusState::default(),
            busy: false,
            listeners: Vec::new(),
            transition_end: None,
        };
        carousel.attach_listeners(dom);
        if !carousel.refresh_pagination(dom) {
            // Render the first page so arrow states match the markup
            let offset = carousel.position.offset();
            carousel.render_pagination(dom, offset);
        }

        info!(
            "Carousel '{}' mounted: {} items, {} in view, {}",
            carousel.options.wrapper_id,
            carousel.layout.item_count(),
            carousel.layout.metrics().elements_in_view,
            carousel.pagination.label()
        );

        Ok(carousel)
    }

    fn attach_listeners<D: Dom>(&mut self, dom: &mut D) {
        let mut targets = vec![
            (dom.window(), EventKind::Resize),
            (self.left_arrow, EventKind::Click),
            (self.right_arrow, EventKind::Click),
            (self.wrapper, EventKind::KeyDown),
            (self.wrapper, EventKind::Focus),
            (self.wrapper, EventKind::Blur),
        ];
        for &control in &self.controls {
            targets.push((control, EventKind::Focus));
            targets.push((control, EventKind::Blur));
        }

        for (node, kind) in targets {
            let subscription = dom.subscribe(node, kind);
            self.listeners.push((node, kind, subscription));
        }
    }

    /// Detach every listener and remove the inserted controls.
    pub fn dispose<D: Dom>(mut self, dom: &mut D) {
        for (_, _, subscription) in self.listeners.drain(..) {
            dom.unsubscribe(subscription);
        }
        if let Some(subscription) = self.transition_end.take() {
            dom.unsubscribe(subscription);
        }
        dom.remove(self.pagination_holder);
        dom.remove(self.left_arrow);
        dom.remove(self.right_arrow);

        info!("Carousel '{}' disposed", self.options.wrapper_id);
    }

    /// Route a document event to the matching handler.
    ///
    /// Returns `false` when this carousel holds no live listener for the
    /// event's target and kind.
    pub fn handle<D: Dom>(&mut self, dom: &mut D, event: &DomEvent) -> bool {
        if event.kind == EventKind::TransitionEnd {
            if event.target != self.content || self.transition_end.is_none() {
                return false;
            }
            self.complete_transition(dom);
            return true;
        }

        let listening = self
            .listeners
            .iter()
            .any(|&(node, kind, _)| node == event.target && kind == event.kind);
        if !listening {
            return false;
        }

        match event.kind {
            EventKind::Resize => self.resize(dom),
            EventKind::Click if event.target == self.left_arrow => {
                self.click(dom, ArrowSide::Left);
            }
            EventKind::Click => {
                self.click(dom, ArrowSide::Right);
            }
            EventKind::KeyDown => {
                if let Some(key) = event.key {
                    self.key_down(dom, key);
                }
            }
            EventKind::Focus if event.target == self.wrapper => self.focus.wrapper_focused(),
            EventKind::Blur if event.target == self.wrapper => self.focus.wrapper_blurred(),
            EventKind::Focus => self.control_focused(dom, event.target),
            EventKind::Blur => self.control_blurred(dom, event.target),
            EventKind::TransitionEnd => {}
        }
        true
    }

    /// Click on an arrow. Ignored while busy or while the arrow is disabled.
    pub fn click<D: Dom>(&mut self, dom: &mut D, side: ArrowSide) -> bool {
        self.jump(dom, side.direction())
    }

    /// Move the strip by one jump distance, snapped onto an item boundary.
    ///
    /// Returns `false`, changing nothing, while a previous jump is still
    /// animating or when the arrow for `direction` is disabled.
    pub fn jump<D: Dom>(&mut self, dom: &mut D, direction: Direction) -> bool {
        if self.busy {
            trace!("Jump {:?} rejected: transition in flight", direction);
            return false;
        }
        if !self.arrow_enabled(direction) {
            trace!("Jump {:?} rejected: arrow disabled", direction);
            return false;
        }

        let current = match self.position.resync(dom, self.wrapper, self.content) {
            Some(offset) => offset,
            None => {
                warn!("Content offset is not valid, jumping from last committed offset");
                self.position.offset()
            }
        };

        let jump_distance = self.layout.metrics().jump_distance;
        let raw = match direction {
            Direction::Left => current.saturating_add(jump_distance),
            Direction::Right => current.saturating_sub(jump_distance),
        };
        let target = self.layout.snap(raw);

        debug!(
            "Jump {:?}: {} -> {} (raw {})",
            direction, current, target, raw
        );
        self.move_to(dom, target, true);
        true
    }

    /// Snap the strip so the item at `index` sits at the left edge.
    ///
    /// This corrects for a focus change that already happened, so it does not
    /// consult the busy guard and does not set it.
    pub fn recentre<D: Dom>(&mut self, dom: &mut D, index: usize) -> bool {
        let Some(left) = self.layout.item_offset(index) else {
            return false;
        };

        debug!("Recentring on item {} at offset {}", index, -left);
        self.move_to(dom, -left, false);
        true
    }

    /// React to a viewport size change.
    ///
    /// Metrics, arrows and pagination follow the new width; the offset is kept
    /// as-is until the next jump snaps it back onto a boundary.
    pub fn resize<D: Dom>(&mut self, dom: &mut D) {
        self.layout.remeasure(dom, self.wrapper);
        self.refresh_pagination(dom);

        debug!(
            "Resized: jump distance {}, {} in view, end stop {}",
            self.layout.metrics().jump_distance,
            self.layout.metrics().elements_in_view,
            self.layout.metrics().end_stop
        );
    }

    fn move_to<D: Dom>(&mut self, dom: &mut D, offset: i32, guarded: bool) {
        self.position.set_offset(offset);

        let subscription = dom.subscribe(self.content, EventKind::TransitionEnd);
        if dom.set_translation(self.content, offset) {
            if let Some(stale) = self.transition_end.replace(subscription) {
                dom.unsubscribe(stale);
            }
            if guarded {
                self.busy = true;
            }
            return;
        }

        dom.unsubscribe(subscription);
        if self.transition_end.is_none() {
            // Nothing to animate, so no transition-end will arrive
            self.complete_transition(dom);
        } else {
            // The running transition already heads here; its end completes the move
            trace!("Offset {} already targeted by the running transition", offset);
        }
    }

    fn complete_transition<D: Dom>(&mut self, dom: &mut D) {
        if let Some(subscription) = self.transition_end.take() {
            dom.unsubscribe(subscription);
        }
        self.busy = false;
        self.refresh_pagination(dom);
    }

    fn refresh_pagination<D: Dom>(&mut self, dom: &mut D) -> bool {
        let Some(offset) = self.position.resync(dom, self.wrapper, self.content) else {
            warn!("Content offset is not valid, pagination not updated");
            return false;
        };
        self.render_pagination(dom, offset);
        true
    }

    fn render_pagination<D: Dom>(&mut self, dom: &mut D, offset: i32) {
        let arrows =
            self.pagination
                .recompute(offset, self.layout.metrics(), self.layout.item_count());

        dom.set_text(self.pagination_holder, &self.pagination.label());
        dom.set_class(self.left_arrow, DISABLED_CLASS, !arrows.left_enabled);
        dom.set_class(self.right_arrow, DISABLED_CLASS, !arrows.right_enabled);
    }

    fn arrow_enabled(&self, direction: Direction) -> bool {
        let arrows = self.pagination.arrows();
        match direction {
            Direction::Left => arrows.left_enabled,
            Direction::Right => arrows.right_enabled,
        }
    }

    fn key_down<D: Dom>(&mut self, dom: &mut D, key: Key) {
        match self.focus.on_key(key) {
            KeyAction::None => {}
            KeyAction::FocusFirstControl => {
                let first = dom
                    .query_classes(self.content, &[self.options.text_input_class.as_str()])
                    .first()
                    .copied();
                match first {
                    Some(control) => {
                        dom.focus(control);
                        self.control_focused(dom, control);
                    }
                    None => debug!("No text input to focus in '{}'", self.options.wrapper_id),
                }
            }
            KeyAction::FocusWrapper => {
                dom.focus(self.wrapper);
                self.focus.wrapper_focused();
            }
            KeyAction::Jump(direction) => {
                self.jump(dom, direction);
            }
        }
    }

    fn control_focused<D: Dom>(&mut self, dom: &mut D, control: NodeId) {
        let index = dom
            .closest_class(control, &self.options.item_class)
            .and_then(|item| self.layout.index_of(item));
        let Some(index) = index else {
            debug!("Focused control {} is not inside an item", control);
            self.focus = FocusState::Unfocused;
            return;
        };

        self.focus.item_focused(index);

        let expandable = dom
            .parent(control)
            .is_some_and(|parent| dom.has_class(parent, &self.options.expandable_class));
        if expandable {
            self.recentre(dom, index);
        }
    }

    fn control_blurred<D: Dom>(&mut self, dom: &D, control: NodeId) {
        if let Some(index) = dom
            .closest_class(control, &self.options.item_class)
            .and_then(|item| self.layout.index_of(item))
        {
            self.focus.item_blurred(index);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let arrows = self.pagination.arrows();
        let metrics = self.layout.metrics();
        Snapshot {
            offset: self.position.offset(),
            current_page: self.pagination.current_page(),
            page_count: self.pagination.page_count(),
            left_enabled: arrows.left_enabled,
            right_enabled: arrows.right_enabled,
            busy: self.busy,
            focus: self.focus,
            pagination_text: self.pagination.label(),
            item_count: self.layout.item_count(),
            jump_distance: metrics.jump_distance,
            end_stop: metrics.end_stop,
        }
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn layout(&self) -> &LayoutModel {
        &self.layout
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn focus_state(&self) -> FocusState {
        self.focus
    }

    pub fn offset(&self) -> i32 {
        self.position.offset()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether a transition-end registration is pending.
    pub fn awaiting_transition(&self) -> bool {
        self.transition_end.is_some()
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn content(&self) -> NodeId {
        self.content
    }

    pub fn left_arrow(&self) -> NodeId {
        self.left_arrow
    }

    pub fn right_arrow(&self) -> NodeId {
        self.right_arrow
    }

    pub fn pagination_holder(&self) -> NodeId {
        self.pagination_holder
    }

    /// Focusable controls inside the items, in document order.
    pub fn controls(&self) -> &[NodeId] {
        &self.controls
    }

    /// Number of listeners currently attached, excluding a pending
    /// transition-end registration.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current offset measured from the document rather than the stored value.
    pub fn measured_offset<D: Dom>(&self, dom: &D) -> Option<i32> {
        measure_offset(dom, self.wrapper, self.content)
    }
}
