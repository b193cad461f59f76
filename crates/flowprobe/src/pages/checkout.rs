//! Checkout wizard pages: information entry, order overview, completion.

use crate::action::ClickPath;
use crate::config::FlowConfig;
use crate::document::Document;
use crate::flow::{CheckoutForm, FlowState, FormField};
use crate::locator::Locator;
use crate::page_object::{Page, PageObject, StateCheck};
use crate::result::FlowResult;

// =============================================================================
// INFORMATION ENTRY
// =============================================================================

/// Checkout step one: buyer information form
#[derive(Debug)]
pub struct CheckoutInfoPage<'a, D: Document> {
    page: Page<'a, D>,
    url_marker: &'a str,
    first_name_input: Locator,
    last_name_input: Locator,
    postal_code_input: Locator,
    continue_button: Locator,
    cancel_button: Locator,
    error_message: Locator,
    error_message_alt: Locator,
}

impl<'a, D: Document> CheckoutInfoPage<'a, D> {
    /// Create the page over a document
    #[must_use]
    pub fn new(document: &'a D, config: &'a FlowConfig) -> Self {
        Self {
            page: Page::new(document, config.wait),
            url_marker: config.site.marker_for(FlowState::CheckoutInfo),
            first_name_input: Locator::id("first-name"),
            last_name_input: Locator::id("last-name"),
            postal_code_input: Locator::id("postal-code"),
            continue_button: Locator::id("continue"),
            cancel_button: Locator::id("cancel"),
            error_message: Locator::data_test("error"),
            error_message_alt: Locator::css(".error-message-container h3"),
        }
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &Page<'a, D> {
        &self.page
    }

    /// Locator of a form field
    #[must_use]
    pub const fn field(&self, field: FormField) -> &Locator {
        match field {
            FormField::FirstName => &self.first_name_input,
            FormField::LastName => &self.last_name_input,
            FormField::PostalCode => &self.postal_code_input,
        }
    }

    /// Type the present fields; absent fields are cleared and left blank
    pub fn fill(&self, form: &CheckoutForm) -> FlowResult<()> {
        for field in FormField::ALL {
            match form.get(field) {
                Some(value) => self.page.type_text(self.field(field), value)?,
                None => self.page.actions().clear(self.field(field))?,
            }
        }
        Ok(())
    }

    /// Click continue
    pub fn submit(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.continue_button)
    }

    /// Click cancel
    pub fn cancel(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.cancel_button)
    }

    /// Validation message shown by the document, primary element first
    pub fn error_message(&self) -> FlowResult<Option<String>> {
        if let Some(text) = self.page.probe_text(&self.error_message)? {
            return Ok(Some(text));
        }
        self.page.probe_text(&self.error_message_alt)
    }

    /// Whether the information form is displayed
    pub fn check(&self) -> StateCheck {
        self.page.check_loaded(self)
    }
}

impl<D: Document> PageObject for CheckoutInfoPage<'_, D> {
    fn page_name(&self) -> &'static str {
        "checkout-info"
    }

    fn url_marker(&self) -> &str {
        self.url_marker
    }

    fn marker(&self) -> &Locator {
        &self.first_name_input
    }
}

// =============================================================================
// ORDER OVERVIEW
// =============================================================================

/// Checkout step two: order summary
#[derive(Debug)]
pub struct CheckoutOverviewPage<'a, D: Document> {
    page: Page<'a, D>,
    url_marker: &'a str,
    finish_button: Locator,
    cancel_button: Locator,
    line_items: Locator,
}

impl<'a, D: Document> CheckoutOverviewPage<'a, D> {
    /// Create the page over a document
    #[must_use]
    pub fn new(document: &'a D, config: &'a FlowConfig) -> Self {
        Self {
            page: Page::new(document, config.wait),
            url_marker: config.site.marker_for(FlowState::CheckoutOverview),
            finish_button: Locator::id("finish"),
            cancel_button: Locator::id("cancel"),
            line_items: Locator::class_name("cart_item"),
        }
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &Page<'a, D> {
        &self.page
    }

    /// Click finish
    pub fn finish(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.finish_button)
    }

    /// Click cancel
    pub fn cancel(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.cancel_button)
    }

    /// Number of line items in the order summary
    pub fn item_count(&self) -> FlowResult<usize> {
        Ok(self.page.find_all(&self.line_items)?.len())
    }

    /// Whether the overview is displayed
    pub fn check(&self) -> StateCheck {
        self.page.check_loaded(self)
    }
}

impl<D: Document> PageObject for CheckoutOverviewPage<'_, D> {
    fn page_name(&self) -> &'static str {
        "checkout-overview"
    }

    fn url_marker(&self) -> &str {
        self.url_marker
    }

    fn marker(&self) -> &Locator {
        &self.finish_button
    }
}

// =============================================================================
// COMPLETION
// =============================================================================

/// Order confirmation page
#[derive(Debug)]
pub struct CheckoutCompletePage<'a, D: Document> {
    page: Page<'a, D>,
    url_marker: &'a str,
    success_header: Locator,
    back_home_button: Locator,
}

impl<'a, D: Document> CheckoutCompletePage<'a, D> {
    /// Create the page over a document
    #[must_use]
    pub fn new(document: &'a D, config: &'a FlowConfig) -> Self {
        Self {
            page: Page::new(document, config.wait),
            url_marker: config.site.marker_for(FlowState::CheckoutComplete),
            success_header: Locator::class_name("complete-header"),
            back_home_button: Locator::id("back-to-products"),
        }
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &Page<'a, D> {
        &self.page
    }

    /// Confirmation header text
    pub fn success_message(&self) -> FlowResult<String> {
        self.page.text_of(&self.success_header)
    }

    /// Click back home
    pub fn back_home(&self) -> FlowResult<ClickPath> {
        self.page.click(&self.back_home_button)
    }
}

impl<D: Document> PageObject for CheckoutCompletePage<'_, D> {
    fn page_name(&self) -> &'static str {
        "checkout-complete"
    }

    fn url_marker(&self) -> &str {
        self.url_marker
    }

    fn marker(&self) -> &Locator {
        &self.success_header
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{ErrorShape, Faults, MockStorefront};
    use crate::wait::WaitPolicy;

    fn config() -> FlowConfig {
        FlowConfig::new().with_wait(
            WaitPolicy::new()
                .with_timeout(200)
                .with_poll_interval(5)
                .with_probe_timeout(30),
        )
    }

    mod info_page_tests {
        use super::*;

        #[test]
        fn test_fill_types_present_fields() {
            let store = MockStorefront::default().at(FlowState::CheckoutInfo);
            let config = config();
            let info = CheckoutInfoPage::new(&store, &config);
            info.fill(&CheckoutForm::new("John", "Doe", "12345")).unwrap();
            assert_eq!(store.field_value(FormField::FirstName), "John");
            assert_eq!(store.field_value(FormField::LastName), "Doe");
            assert_eq!(store.field_value(FormField::PostalCode), "12345");
        }

        #[test]
        fn test_fill_leaves_absent_blank() {
            let store = MockStorefront::default().at(FlowState::CheckoutInfo);
            let config = config();
            let info = CheckoutInfoPage::new(&store, &config);
            info.fill(&CheckoutForm::new("John", "Doe", "12345")).unwrap();
            info.fill(&CheckoutForm::new("John", "Doe", "12345").without(FormField::LastName))
                .unwrap();
            assert_eq!(store.field_value(FormField::LastName), "");
        }

        #[test]
        fn test_error_message_primary() {
            let store = MockStorefront::default().at(FlowState::CheckoutInfo);
            let config = config();
            let info = CheckoutInfoPage::new(&store, &config);
            info.submit().unwrap();
            assert_eq!(
                info.error_message().unwrap().as_deref(),
                Some("Error: First Name is required")
            );
        }

        #[test]
        fn test_error_message_alternate() {
            let store = MockStorefront::default()
                .at(FlowState::CheckoutInfo)
                .with_faults(Faults::new().with_error_shape(ErrorShape::Alternate));
            let config = config();
            let info = CheckoutInfoPage::new(&store, &config);
            info.fill(&CheckoutForm::new("John", "Doe", "12345").without(FormField::PostalCode))
                .unwrap();
            info.submit().unwrap();
            assert_eq!(
                info.error_message().unwrap().as_deref(),
                Some("Error: Postal Code is required")
            );
        }

        #[test]
        fn test_no_error_message() {
            let store = MockStorefront::default().at(FlowState::CheckoutInfo);
            let config = config();
            assert_eq!(CheckoutInfoPage::new(&store, &config).error_message().unwrap(), None);
        }
    }

    mod overview_page_tests {
        use super::*;

        #[test]
        fn test_overview_items_and_finish() {
            let store = MockStorefront::default().at(FlowState::CheckoutOverview);
            let config = config();
            let overview = CheckoutOverviewPage::new(&store, &config);
            assert!(overview.check().is_confirmed());
            assert_eq!(overview.item_count().unwrap(), 2);
            overview.finish().unwrap();
            assert_eq!(store.state(), Some(FlowState::CheckoutComplete));
        }
    }

    mod complete_page_tests {
        use super::*;

        #[test]
        fn test_success_message() {
            let store = MockStorefront::default().at(FlowState::CheckoutComplete);
            let config = config();
            let complete = CheckoutCompletePage::new(&store, &config);
            assert!(complete
                .success_message()
                .unwrap()
                .to_uppercase()
                .contains("THANK YOU FOR YOUR ORDER"));
            complete.back_home().unwrap();
            assert_eq!(store.state(), Some(FlowState::Inventory));
        }
    }
}
