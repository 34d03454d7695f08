//! Horizontal offset of the content strip.

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};
use crate::round_half_up;

/// The last offset the engine committed.
///
/// This is a passive store: callers clamp and snap before writing. Anything
/// that computes a new position reads the live geometry through
/// [`measure_offset`] instead, because focus-driven scrolling and layout
/// changes can move the strip without going through the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    offset: i32,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `px` verbatim.
    pub fn set_offset(&mut self, px: i32) {
        self.offset = px;
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Re-read the live offset and store it. Returns `None`, leaving the
    /// stored value untouched, when the measurement is not usable.
    pub fn resync<D: Dom>(&mut self, dom: &D, wrapper: NodeId, content: NodeId) -> Option<i32> {
        let offset = measure_offset(dom, wrapper, content)?;
        self.offset = offset;
        Some(offset)
    }
}

/// Live offset of `content` relative to `wrapper`, from rendered positions.
pub fn measure_offset<D: Dom>(dom: &D, wrapper: NodeId, content: NodeId) -> Option<i32> {
    let content_left = dom.client_left(content);
    let wrapper_left = dom.client_left(wrapper);

    if !content_left.is_finite() || !wrapper_left.is_finite() {
        return None;
    }

    Some(round_half_up(content_left) as i32 - round_half_up(wrapper_left) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_passive_store() {
        let mut position = PositionState::new();
        assert_eq!(position.offset(), 0);

        // Stored verbatim, even outside the intended range
        position.set_offset(120);
        assert_eq!(position.offset(), 120);
        position.set_offset(-948);
        assert_eq!(position.offset(), -948);
    }
}
