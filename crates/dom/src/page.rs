//! Builds a product-grid page for a carousel to mount on.

use carousel_core::ElementSpec;
use serde::{Deserialize, Serialize};

use crate::{Document, DomError};

/// Description of a rendered carousel page.
///
/// Each item is an `li.gridItem` holding a product link and a quantity text
/// input. For items listed in `expandable_items` the input sits inside a
/// `div.contractLink`, otherwise inside a plain `div.quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    pub wrapper_id: String,
    pub content_id: String,
    /// Left edge of the wrapper in the viewport.
    pub wrapper_left: f64,
    /// Rendered wrapper width.
    pub viewport_width: f64,
    pub item_count: usize,
    /// Rendered width of one item, excluding its margin.
    pub item_width: f64,
    /// Right margin after each item.
    pub item_margin: f64,
    /// Indices of items whose input is an expandable control.
    pub expandable_items: Vec<usize>,
    /// Whether translation changes animate.
    pub transitions: bool,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            wrapper_id: "temp".to_string(),
            content_id: "temp2".to_string(),
            wrapper_left: 0.0,
            viewport_width: 935.0,
            item_count: 8,
            item_width: 224.0,
            item_margin: 13.0,
            expandable_items: Vec::new(),
            transitions: true,
        }
    }
}

impl PageFixture {
    /// Item pitch: rendered width plus margin.
    pub fn item_pitch(&self) -> f64 {
        self.item_width + self.item_margin
    }

    /// Render the page.
    pub fn build(&self) -> Result<Document, DomError> {
        let mut doc = Document::new();
        doc.set_transitions_enabled(self.transitions);

        let wrapper = doc.create_element(
            Document::BODY,
            &ElementSpec::new("div")
                .with_id(&self.wrapper_id)
                .with_class("carouselWrapper"),
            self.wrapper_left,
            self.viewport_width,
        )?;
        let content = doc.create_element(
            wrapper,
            &ElementSpec::new("ul")
                .with_id(&self.content_id)
                .with_class("carouselInner"),
            0.0,
            0.0,
        )?;

        for index in 0..self.item_count {
            let item = doc.create_element(
                content,
                &ElementSpec::new("li").with_class("gridItem"),
                index as f64 * self.item_pitch(),
                self.item_width,
            )?;

            let info = doc.create_element(
                item,
                &ElementSpec::new("div").with_class("productInfo"),
                0.0,
                self.item_width,
            )?;
            doc.create_element(
                info,
                &ElementSpec::new("a")
                    .with_class("link")
                    .with_text(&format!("Product {}", index + 1)),
                0.0,
                self.item_width,
            )?;

            let holder_class = if self.expandable_items.contains(&index) {
                "contractLink"
            } else {
                "quantity"
            };
            let holder = doc.create_element(
                item,
                &ElementSpec::new("div").with_class(holder_class),
                0.0,
                self.item_width,
            )?;
            doc.create_element(
                holder,
                &ElementSpec::new("input").with_class("input-text"),
                0.0,
                self.item_width,
            )?;
        }

        Ok(doc)
    }
}
