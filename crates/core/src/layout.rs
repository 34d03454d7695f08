//! Item geometry and viewport metrics.

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};
use crate::round_half_up;

/// Viewport-dependent metrics, recomputed on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    /// Total width of the strip: item count times nominal item width.
    pub content_width: i32,
    /// Measured wrapper width.
    pub viewport_width: i32,
    /// Distance one jump moves the strip: viewport width plus the margin gap.
    pub jump_distance: i32,
    /// Whole items that fit in one jump distance.
    pub elements_in_view: usize,
    /// Most negative offset that still shows content up to the last item.
    pub end_stop: i32,
}

impl LayoutMetrics {
    /// Compute metrics for a strip of `item_count` items of `item_width`.
    ///
    /// `jump_distance` and `elements_in_view` are floored at 1 so a collapsed
    /// viewport can never produce a division by zero downstream.
    pub fn compute(item_count: usize, item_width: i32, viewport_width: i32, margin_gap: i32) -> Self {
        let content_width = i32::try_from(item_count)
            .unwrap_or(i32::MAX)
            .saturating_mul(item_width);
        let jump_distance = viewport_width.saturating_add(margin_gap).max(1);
        let elements_in_view = if item_width > 0 {
            (jump_distance / item_width).max(1) as usize
        } else {
            1
        };

        Self {
            content_width,
            viewport_width,
            jump_distance,
            elements_in_view,
            end_stop: jump_distance.saturating_sub(content_width),
        }
    }
}

/// Per-item left offsets plus the current viewport metrics.
///
/// The offset table is read from rendered layout once at mount and never
/// changes afterwards. Only the metrics follow the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutModel {
    items: Vec<NodeId>,
    item_offsets: Vec<i32>,
    item_width: i32,
    margin_gap: i32,
    metrics: LayoutMetrics,
}

impl LayoutModel {
    /// Build a model from an already known offset table.
    pub fn new(item_offsets: Vec<i32>, item_width: i32, margin_gap: i32, viewport_width: i32) -> Self {
        let metrics =
            LayoutMetrics::compute(item_offsets.len(), item_width, viewport_width, margin_gap);
        Self {
            items: Vec::new(),
            item_offsets,
            item_width,
            margin_gap,
            metrics,
        }
    }

    /// Measure `items` and the wrapper from the rendered document.
    pub fn measure<D: Dom>(
        dom: &D,
        wrapper: NodeId,
        items: Vec<NodeId>,
        item_width: i32,
        margin_gap: i32,
    ) -> Self {
        let item_offsets = items
            .iter()
            .map(|&item| measured_px(dom.offset_left(item)))
            .collect();
        let viewport_width = measured_px(dom.width(wrapper));

        Self {
            items,
            ..Self::new(item_offsets, item_width, margin_gap, viewport_width)
        }
    }

    /// Recompute the viewport metrics for a new wrapper width.
    pub fn recompute(&mut self, viewport_width: i32) {
        self.metrics = LayoutMetrics::compute(
            self.item_offsets.len(),
            self.item_width,
            viewport_width,
            self.margin_gap,
        );
    }

    /// Re-measure the wrapper and recompute the viewport metrics.
    pub fn remeasure<D: Dom>(&mut self, dom: &D, wrapper: NodeId) {
        self.recompute(measured_px(dom.width(wrapper)));
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn item_count(&self) -> usize {
        self.item_offsets.len()
    }

    pub fn item_width(&self) -> i32 {
        self.item_width
    }

    pub fn item_offsets(&self) -> &[i32] {
        &self.item_offsets
    }

    /// Left offset of the item at `index` within the content element.
    pub fn item_offset(&self, index: usize) -> Option<i32> {
        self.item_offsets.get(index).copied()
    }

    /// Position of an item node in the strip.
    pub fn index_of(&self, item: NodeId) -> Option<usize> {
        self.items.iter().position(|&n| n == item)
    }

    /// Snap a raw target offset onto an item boundary.
    ///
    /// The approximate item index is derived from the physical distance using
    /// the nominal item width, then replaced by that item's measured left edge.
    /// The result never overscrolls past the start and never moves beyond the
    /// end stop, except that the first item is always reachable.
    pub fn snap(&self, target: i32) -> i32 {
        let Some(last) = self.item_offsets.len().checked_sub(1) else {
            return 0;
        };

        let distance = target.min(0).saturating_neg() as f64;
        let approx = round_half_up(distance / self.item_width.max(1) as f64) as usize;
        let mut index = approx.min(last);

        while index > 0 && self.item_offsets[index].saturating_neg() < self.metrics.end_stop {
            index -= 1;
        }

        self.item_offsets[index].saturating_neg().min(0)
    }
}

/// Convert a measured length to whole pixels; non-finite readings become 0.
fn measured_px(value: f64) -> i32 {
    if value.is_finite() {
        round_half_up(value) as i32
    } else {
        0
    }
}
