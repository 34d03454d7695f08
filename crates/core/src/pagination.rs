//! Page indicator and arrow enable state.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutMetrics;
use crate::round_half_up;

/// Which arrows accept clicks. Written only by [`Pagination::recompute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowStates {
    pub left_enabled: bool,
    pub right_enabled: bool,
}

/// Current page and page count derived from the offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    current_page: i32,
    page_count: i32,
    arrows: ArrowStates,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_count: 1,
            arrows: ArrowStates::default(),
        }
    }
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive page state from `offset` and refresh the arrow states.
    ///
    /// The page count is widened to cover the current page, so a long manual
    /// move can never report "page 5 of 3". The last page is reported exactly
    /// when the offset is at or past the end stop, that is when the last item
    /// is visible.
    pub fn recompute(&mut self, offset: i32, metrics: &LayoutMetrics, item_count: usize) -> ArrowStates {
        let jump = metrics.jump_distance.max(1) as f64;
        let current = round_half_up(-(offset as f64 - jump) / jump) as i32;
        let natural = item_count.div_ceil(metrics.elements_in_view.max(1)) as i32;

        let count = natural.max(current).max(1);
        let current = if offset <= metrics.end_stop {
            count
        } else if count > 1 {
            current.min(count - 1)
        } else {
            current
        };

        self.current_page = current;
        self.page_count = count;
        self.arrows = ArrowStates {
            left_enabled: current > 1,
            right_enabled: current < count,
        };
        self.arrows
    }

    pub fn current_page(&self) -> i32 {
        self.current_page
    }

    pub fn page_count(&self) -> i32 {
        self.page_count
    }

    pub fn arrows(&self) -> ArrowStates {
        self.arrows
    }

    /// Indicator text, e.g. `"2 of 3"`.
    pub fn label(&self) -> String {
        format!("{} of {}", self.current_page, self.page_count)
    }
}
