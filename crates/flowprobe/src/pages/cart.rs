//! Cart page: entry point of the checkout wizard.

use crate::action::ClickPath;
use crate::config::FlowConfig;
use crate::document::Document;
use crate::flow::FlowState;
use crate::locator::Locator;
use crate::page_object::{Page, PageObject, StateCheck};
use crate::result::FlowResult;

/// Shopping cart page
#[derive(Debug)]
pub struct CartPage<'a, D: Document> {
    page: Page<'a, D>,
    url_marker: &'a str,
    checkout_button: Locator,
    continue_shopping_button: Locator,
    cart_items: Locator,
}

impl<'a, D: Document> CartPage<'a, D> {
    /// Create the page over a document
    #[must_use]
    pub fn new(document: &'a D, config: &'a FlowConfig) -> Self {
        Self {
            page: Page::new(document, config.wait),
            url_marker: config.site.marker_for(FlowState::Cart),
            checkout_button: Locator::id("checkout"),
            continue_shopping_button: Locator::id("continue-shopping"),
            cart_items: Locator::class_name("cart_item"),
        }
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &Page<'a, D> {
        &self.page
    }

    /// Click the checkout button
    pub fn checkout(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.checkout_button)
    }

    /// Click the continue shopping button
    pub fn continue_shopping(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.continue_shopping_button)
    }

    /// Number of line items in the cart
    pub fn item_count(&self) -> FlowResult<usize> {
        Ok(self.page.find_all(&self.cart_items)?.len())
    }

    /// Whether the cart is displayed
    pub fn check(&self) -> StateCheck {
        self.page.check_loaded(self)
    }
}

impl<D: Document> PageObject for CartPage<'_, D> {
    fn page_name(&self) -> &'static str {
        "cart"
    }

    fn url_marker(&self) -> &str {
        self.url_marker
    }

    fn marker(&self) -> &Locator {
        &self.checkout_button
    }
}
