//! Inventory page (product listing). Only its identity is modeled.

use crate::config::FlowConfig;
use crate::document::Document;
use crate::flow::FlowState;
use crate::locator::Locator;
use crate::page_object::{Page, PageObject};

/// Product listing page, reached by cancelling an overview or going back home
#[derive(Debug)]
pub struct InventoryPage<'a, D: Document> {
    page: Page<'a, D>,
    url_marker: &'a str,
    inventory_list: Locator,
}

impl<'a, D: Document> InventoryPage<'a, D> {
    /// Create the page over a document
    #[must_use]
    pub fn new(document: &'a D, config: &'a FlowConfig) -> Self {
        Self {
            page: Page::new(document, config.wait),
            url_marker: config.site.marker_for(FlowState::Inventory),
            inventory_list: Locator::class_name("inventory_list"),
        }
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &Page<'a, D> {
        &self.page
    }
}

impl<D: Document> PageObject for InventoryPage<'_, D> {
    fn page_name(&self) -> &'static str {
        "inventory"
    }

    fn url_marker(&self) -> &str {
        self.url_marker
    }

    fn marker(&self) -> &Locator {
        &self.inventory_list
    }
}
