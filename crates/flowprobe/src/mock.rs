//! Simulated storefront for deterministic tests.
//!
//! [`MockStorefront`] implements [`Document`] over an in-memory model of the
//! cart and checkout pages. Cloned handles share one model, so a test can
//! keep a handle to inspect the document after handing another to a flow.
//!
//! Faults reproduce the timing and rendering problems the flow has to
//! survive: delayed rendering, intercepted or stale clicks, alternate error
//! markup, submissions that never navigate, and a success header that never
//! becomes visible.

use crate::action::SCRIPTED_CLICK;
use crate::config::SiteMap;
use crate::document::{Document, Element};
use crate::flow::{FlowState, FormField};
use crate::locator::Locator;
use crate::result::{FlowError, FlowResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Confirmation header text on the completion page
pub const SUCCESS_HEADER_TEXT: &str = "Thank you for your order!";

const PRODUCTS: [&str; 6] = [
    "Sauce Labs Backpack",
    "Sauce Labs Bike Light",
    "Sauce Labs Bolt T-Shirt",
    "Sauce Labs Fleece Jacket",
    "Sauce Labs Onesie",
    "Test.allTheThings() T-Shirt (Red)",
];

// =============================================================================
// FAULTS
// =============================================================================

/// Markup used for the validation message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorShape {
    /// `[data-test='error']`
    #[default]
    Primary,
    /// `.error-message-container h3`
    Alternate,
    /// Validation blocks navigation but renders no message element
    Missing,
}

/// Fault injection knobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Faults {
    /// Time after each navigation before elements are displayed
    pub render_delay: Duration,
    /// Number of native clicks rejected as intercepted
    pub intercepted_clicks: u32,
    /// Number of native clicks rejected as stale
    pub stale_clicks: u32,
    /// Validation message markup
    pub error_shape: ErrorShape,
    /// Continue and finish controls never navigate
    pub stall_navigation: bool,
    /// Success header stays hidden
    pub hide_success_header: bool,
    /// Every script execution fails
    pub failing_scripts: bool,
}

impl Faults {
    /// No faults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay rendering after each navigation
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Reject the next `count` native clicks as intercepted
    #[must_use]
    pub const fn with_intercepted_clicks(mut self, count: u32) -> Self {
        self.intercepted_clicks = count;
        self
    }

    /// Reject the next `count` native clicks as stale
    #[must_use]
    pub const fn with_stale_clicks(mut self, count: u32) -> Self {
        self.stale_clicks = count;
        self
    }

    /// Render validation messages with the given markup
    #[must_use]
    pub const fn with_error_shape(mut self, shape: ErrorShape) -> Self {
        self.error_shape = shape;
        self
    }

    /// Make continue and finish stop navigating
    #[must_use]
    pub const fn with_stalled_navigation(mut self) -> Self {
        self.stall_navigation = true;
        self
    }

    /// Keep the success header hidden
    #[must_use]
    pub const fn with_hidden_success_header(mut self) -> Self {
        self.hide_success_header = true;
        self
    }

    /// Fail every script execution
    #[must_use]
    pub const fn with_failing_scripts(mut self) -> Self {
        self.failing_scripts = true;
        self
    }
}

// =============================================================================
// MODEL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Title,
    Checkout,
    ContinueShopping,
    CartItem(usize),
    Field(FormField),
    Continue,
    Cancel,
    Error,
    Finish,
    SuccessHeader,
    BackHome,
    InventoryList,
}

#[derive(Debug)]
struct Storefront {
    site: SiteMap,
    location: String,
    page: Option<FlowState>,
    generation: u64,
    rendered_at: Instant,
    fields: [String; 3],
    error: Option<String>,
    cart_items: usize,
    faults: Faults,
    history: Vec<String>,
    native_clicks: usize,
    scripted_clicks: usize,
}

const fn field_index(field: FormField) -> usize {
    match field {
        FormField::FirstName => 0,
        FormField::LastName => 1,
        FormField::PostalCode => 2,
    }
}

impl Storefront {
    fn new(site: SiteMap) -> Self {
        Self {
            location: site.url_for(FlowState::Cart),
            site,
            page: Some(FlowState::Cart),
            generation: 0,
            rendered_at: Instant::now(),
            fields: Default::default(),
            error: None,
            cart_items: 2,
            faults: Faults::default(),
            history: Vec::new(),
            native_clicks: 0,
            scripted_clicks: 0,
        }
    }

    fn load(&mut self, location: String, page: Option<FlowState>) {
        self.location = location;
        self.page = page;
        self.generation += 1;
        self.rendered_at = Instant::now();
        self.error = None;
        match page {
            Some(FlowState::CheckoutInfo) => self.fields = Default::default(),
            Some(FlowState::CheckoutComplete) => self.cart_items = 0,
            _ => {}
        }
    }

    fn go(&mut self, state: FlowState) {
        let url = self.site.url_for(state);
        self.load(url, Some(state));
    }

    fn submit_to(&mut self, state: FlowState) {
        if self.faults.stall_navigation {
            self.history.push(format!("stalled:{state}"));
        } else {
            self.go(state);
        }
    }

    fn nodes(&self) -> Vec<(String, Node)> {
        let mut nodes = vec![(".title".to_string(), Node::Title)];
        let items = |nodes: &mut Vec<(String, Node)>| {
            for i in 0..self.cart_items {
                nodes.push((".cart_item".to_string(), Node::CartItem(i)));
            }
        };
        match self.page {
            Some(FlowState::Cart) => {
                nodes.push(("#checkout".to_string(), Node::Checkout));
                nodes.push(("#continue-shopping".to_string(), Node::ContinueShopping));
                items(&mut nodes);
            }
            Some(FlowState::CheckoutInfo) => {
                nodes.push(("#first-name".to_string(), Node::Field(FormField::FirstName)));
                nodes.push(("#last-name".to_string(), Node::Field(FormField::LastName)));
                nodes.push(("#postal-code".to_string(), Node::Field(FormField::PostalCode)));
                nodes.push(("#continue".to_string(), Node::Continue));
                nodes.push(("#cancel".to_string(), Node::Cancel));
                if self.error.is_some() {
                    match self.faults.error_shape {
                        ErrorShape::Primary => {
                            nodes.push(("[data-test='error']".to_string(), Node::Error));
                        }
                        ErrorShape::Alternate => {
                            nodes.push((".error-message-container h3".to_string(), Node::Error));
                        }
                        ErrorShape::Missing => {}
                    }
                }
            }
            Some(FlowState::CheckoutOverview) => {
                nodes.push(("#finish".to_string(), Node::Finish));
                nodes.push(("#cancel".to_string(), Node::Cancel));
                items(&mut nodes);
            }
            Some(FlowState::CheckoutComplete) => {
                nodes.push((".complete-header".to_string(), Node::SuccessHeader));
                nodes.push(("#back-to-products".to_string(), Node::BackHome));
            }
            Some(FlowState::Inventory) => {
                nodes.push((".inventory_list".to_string(), Node::InventoryList));
            }
            None => nodes.clear(),
        }
        nodes
    }

    fn is_displayed(&self, node: Node) -> bool {
        if self.rendered_at.elapsed() < self.faults.render_delay {
            return false;
        }
        !(node == Node::SuccessHeader && self.faults.hide_success_header)
    }

    fn check_live(&self, element: &MockElement) -> FlowResult<()> {
        if element.generation == self.generation {
            Ok(())
        } else {
            Err(FlowError::StaleElement {
                locator: element.selector.clone(),
            })
        }
    }

    fn activate(&mut self, node: Node) {
        match node {
            Node::Checkout => self.go(FlowState::CheckoutInfo),
            Node::ContinueShopping | Node::BackHome => self.go(FlowState::Inventory),
            Node::Continue => {
                let missing = FormField::ALL
                    .into_iter()
                    .find(|field| self.fields[field_index(*field)].is_empty());
                match missing {
                    Some(field) => self.error = Some(format!("Error: {} is required", field.label())),
                    None => self.submit_to(FlowState::CheckoutOverview),
                }
            }
            Node::Cancel => match self.page {
                Some(FlowState::CheckoutInfo) => self.go(FlowState::Cart),
                Some(FlowState::CheckoutOverview) => self.go(FlowState::Inventory),
                _ => {}
            },
            Node::Finish => self.submit_to(FlowState::CheckoutComplete),
            _ => {}
        }
    }

    fn text(&self, node: Node) -> String {
        match node {
            Node::Title => match self.page {
                Some(FlowState::Cart) => "Your Cart",
                Some(FlowState::CheckoutInfo) => "Checkout: Your Information",
                Some(FlowState::CheckoutOverview) => "Checkout: Overview",
                Some(FlowState::CheckoutComplete) => "Checkout: Complete!",
                Some(FlowState::Inventory) => "Products",
                None => "",
            }
            .to_string(),
            Node::Checkout => "Checkout".to_string(),
            Node::ContinueShopping => "Continue Shopping".to_string(),
            Node::CartItem(i) => PRODUCTS[i % PRODUCTS.len()].to_string(),
            Node::Field(_) | Node::InventoryList => String::new(),
            Node::Continue => "Continue".to_string(),
            Node::Cancel => "Cancel".to_string(),
            Node::Error => self.error.clone().unwrap_or_default(),
            Node::Finish => "Finish".to_string(),
            Node::SuccessHeader => SUCCESS_HEADER_TEXT.to_string(),
            Node::BackHome => "Back Home".to_string(),
        }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// In-memory storefront document
#[derive(Debug, Clone)]
pub struct MockStorefront {
    inner: Arc<Mutex<Storefront>>,
}

impl Default for MockStorefront {
    fn default() -> Self {
        Self::new(SiteMap::default())
    }
}

impl MockStorefront {
    /// Storefront showing a cart with two items
    #[must_use]
    pub fn new(site: SiteMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Storefront::new(site))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Storefront> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the page of a state
    #[must_use]
    pub fn at(self, state: FlowState) -> Self {
        self.lock().go(state);
        self
    }

    /// Replace the fault set
    #[must_use]
    pub fn with_faults(self, faults: Faults) -> Self {
        self.set_faults(faults);
        self
    }

    /// Set the number of cart items
    #[must_use]
    pub fn with_cart_items(self, count: usize) -> Self {
        self.lock().cart_items = count;
        self
    }

    /// Replace the fault set on a shared handle
    pub fn set_faults(&self, faults: Faults) {
        self.lock().faults = faults;
    }

    /// Remove one cart item, if any
    pub fn remove_cart_item(&self) {
        let mut store = self.lock();
        store.cart_items = store.cart_items.saturating_sub(1);
    }

    /// State of the displayed page, `None` for unknown locations
    #[must_use]
    pub fn state(&self) -> Option<FlowState> {
        self.lock().page
    }

    /// Current location
    #[must_use]
    pub fn location(&self) -> String {
        self.lock().location.clone()
    }

    /// Current value of a form field
    #[must_use]
    pub fn field_value(&self, field: FormField) -> String {
        self.lock().fields[field_index(field)].clone()
    }

    /// Accepted native clicks
    #[must_use]
    pub fn native_clicks(&self) -> usize {
        self.lock().native_clicks
    }

    /// Accepted scripted clicks
    #[must_use]
    pub fn scripted_clicks(&self) -> usize {
        self.lock().scripted_clicks
    }

    /// Interaction log, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    fn elements(&self, locator: &Locator) -> Vec<MockElement> {
        let store = self.lock();
        let wanted = locator.to_string();
        store
            .nodes()
            .into_iter()
            .filter(|(selector, _)| *selector == wanted)
            .map(|(selector, node)| MockElement {
                inner: Arc::clone(&self.inner),
                node,
                generation: store.generation,
                selector,
            })
            .collect()
    }
}

impl Document for MockStorefront {
    type Element = MockElement;

    fn navigate_to(&self, url: &str) -> FlowResult<()> {
        let mut store = self.lock();
        store.history.push(format!("navigate:{url}"));
        let page = store.site.state_at(url);
        store.load(url.to_string(), page);
        Ok(())
    }

    fn current_location(&self) -> FlowResult<String> {
        Ok(self.location())
    }

    fn find_element(&self, locator: &Locator) -> FlowResult<Option<MockElement>> {
        Ok(self.elements(locator).into_iter().next())
    }

    fn find_elements(&self, locator: &Locator) -> FlowResult<Vec<MockElement>> {
        Ok(self.elements(locator))
    }

    fn execute_script(&self, script: &str, args: &[&MockElement]) -> FlowResult<serde_json::Value> {
        let mut store = self.lock();
        if store.faults.failing_scripts {
            return Err(FlowError::script("script execution disabled"));
        }
        match (script.trim(), args) {
            (SCRIPTED_CLICK, [target]) => {
                store.check_live(target)?;
                store.scripted_clicks += 1;
                store.history.push(format!("script-click:{}", target.selector));
                store.activate(target.node);
                Ok(serde_json::Value::Null)
            }
            _ => Err(FlowError::script(format!("unsupported script: {script}"))),
        }
    }
}

/// Element handle into a [`MockStorefront`]
#[derive(Debug, Clone)]
pub struct MockElement {
    inner: Arc<Mutex<Storefront>>,
    node: Node,
    generation: u64,
    selector: String,
}

impl MockElement {
    fn lock(&self) -> MutexGuard<'_, Storefront> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn field(&self) -> FlowResult<FormField> {
        match self.node {
            Node::Field(field) => Ok(field),
            _ => Err(FlowError::not_interactable(format!(
                "{} is not editable",
                self.selector
            ))),
        }
    }
}

impl Element for MockElement {
    fn click(&self) -> FlowResult<()> {
        let mut store = self.lock();
        store.check_live(self)?;
        if store.faults.stale_clicks > 0 {
            store.faults.stale_clicks -= 1;
            store.history.push(format!("stale-click:{}", self.selector));
            return Err(FlowError::StaleElement {
                locator: self.selector.clone(),
            });
        }
        if store.faults.intercepted_clicks > 0 {
            store.faults.intercepted_clicks -= 1;
            store.history.push(format!("intercepted-click:{}", self.selector));
            return Err(FlowError::not_interactable(format!(
                "click on {} intercepted: <div class=\"overlay\"> would receive the click",
                self.selector
            )));
        }
        if !store.is_displayed(self.node) {
            return Err(FlowError::not_interactable(format!(
                "{} is not visible",
                self.selector
            )));
        }
        store.native_clicks += 1;
        store.history.push(format!("click:{}", self.selector));
        store.activate(self.node);
        Ok(())
    }

    fn clear(&self) -> FlowResult<()> {
        let field = self.field()?;
        let mut store = self.lock();
        store.check_live(self)?;
        store.fields[field_index(field)].clear();
        Ok(())
    }

    fn send_text(&self, text: &str) -> FlowResult<()> {
        let field = self.field()?;
        let mut store = self.lock();
        store.check_live(self)?;
        store.history.push(format!("type:{}", self.selector));
        store.fields[field_index(field)].push_str(text);
        Ok(())
    }

    fn text(&self) -> FlowResult<String> {
        let store = self.lock();
        store.check_live(self)?;
        Ok(store.text(self.node))
    }

    fn is_displayed(&self) -> FlowResult<bool> {
        let store = self.lock();
        store.check_live(self)?;
        Ok(store.is_displayed(self.node))
    }

    fn is_enabled(&self) -> FlowResult<bool> {
        self.lock().check_live(self)?;
        Ok(true)
    }

    fn attribute(&self, name: &str) -> FlowResult<Option<String>> {
        let store = self.lock();
        store.check_live(self)?;
        Ok(match (name, self.node) {
            ("value", Node::Field(field)) => Some(store.fields[field_index(field)].clone()),
            ("id", _) => self.selector.strip_prefix('#').map(str::to_string),
            ("data-test", Node::Error) => Some("error".to_string()),
            _ => None,
        })
    }
}
