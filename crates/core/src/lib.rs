//! Carousel Core Engine
//!
//! Platform-agnostic positioning and pagination engine for a horizontally
//! scrolling carousel.
//!
//! This crate implements the "fixed viewport over a wide strip" paradigm where:
//! - Fixed-size items are laid out in a single row wider than the wrapper
//! - The wrapper acts as a viewport; the content strip is translated under it
//! - Every navigation lands on the left edge of a real item
//!
//! The engine never touches a concrete document. Everything it measures or
//! mutates goes through the [`Dom`] trait, so the same engine runs against a
//! browser binding or the headless document in `carousel-dom`.

mod carousel;
pub mod dom;
mod focus;
mod layout;
mod pagination;
mod position;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use carousel::{
    Carousel, CarouselOptions, Snapshot, ARROW_CLASS, DISABLED_CLASS, PAGINATION_CLASS,
    RIGHT_ARROW_CLASS,
};
pub use dom::{Dom, DomEvent, ElementSpec, EventKind, NodeId, Subscription};
pub use focus::{FocusState, Key, KeyAction};
pub use layout::{LayoutMetrics, LayoutModel};
pub use pagination::{ArrowStates, Pagination};
pub use position::{measure_offset, PositionState};

/// Errors that can occur while mounting a carousel.
///
/// Both variants are configuration errors: the page does not contain the
/// elements the options name. They are not recoverable at runtime.
#[derive(Debug, Error)]
pub enum CarouselError {
    #[error("Wrapper element '{0}' not found")]
    WrapperNotFound(String),

    #[error("Content element '{0}' not found")]
    ContentNotFound(String),
}

/// Direction of a jump.
///
/// `Left` reveals earlier items (the strip moves right, offset grows towards 0).
/// `Right` reveals later items (offset grows more negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

/// A physical arrow control inserted into the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowSide {
    Left,
    Right,
}

impl ArrowSide {
    /// The jump a click on this arrow requests.
    ///
    /// The left arrow reveals earlier items and the right arrow reveals later
    /// ones, whatever the historical handler names suggested.
    pub fn direction(self) -> Direction {
        match self {
            ArrowSide::Left => Direction::Left,
            ArrowSide::Right => Direction::Right,
        }
    }
}

/// Round half towards positive infinity, the way browsers round pixel math.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_side_direction() {
        assert_eq!(ArrowSide::Left.direction(), Direction::Left);
        assert_eq!(ArrowSide::Right.direction(), Direction::Right);
    }

    #[test]
    fn test_round_half_up_matches_browser_rounding() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        // f64::round would give -3 here
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
    }

    #[test]
    fn test_error_messages() {
        let err = CarouselError::WrapperNotFound("carousel1".to_string());
        assert_eq!(err.to_string(), "Wrapper element 'carousel1' not found");
        let err = CarouselError::ContentNotFound("list1".to_string());
        assert_eq!(err.to_string(), "Content element 'list1' not found");
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::Right).unwrap();
        assert_eq!(json, "\"right\"");
        let parsed: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Direction::Left);
    }
}
