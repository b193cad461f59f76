//! Checkout Flow State Machine
//!
//! [`CheckoutFlow`] models the purchase wizard as an explicit state machine
//! layered on the page objects:
//!
//! ```text
//!            checkout()               fill_info(complete)           finish()
//!   Cart ──────────────► CheckoutInfo ─────────────────► CheckoutOverview ───► CheckoutComplete
//!    ▲                    │    ▲   │                              │                 │
//!    └──── cancel() ──────┘    └───┘ fill_info(incomplete)        │ cancel()        │ back_home()
//!                                                                 ▼                 │
//!                                                             Inventory ◄───────────┘
//! ```
//!
//! Every transition verifies that the document actually arrived where the
//! flow claims to be before the state changes. A failed transition leaves
//! the state untouched.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Unverifiable transitions fail instead of reporting success
//! - **Poka-Yoke**: Operations unavailable in the current state are rejected up front
//! - **Genchi Genbutsu**: State queries observe the live document

use crate::action::ClickPath;
use crate::config::{FlowConfig, SubmitStrategy};
use crate::document::Document;
use crate::page_object::{Page, StateCheck};
use crate::pages::{
    CartPage, CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage, InventoryPage,
};
use crate::result::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Message reported when the document shows no validation element but the
/// information form is still displayed after a submission
pub const GENERIC_VALIDATION_MESSAGE: &str = "Error: a required checkout field is missing";

/// Cancellation destinations keyed by the state `cancel()` is invoked from
pub const CANCEL_ROUTES: [(FlowState, FlowState); 2] = [
    (FlowState::CheckoutInfo, FlowState::Cart),
    (FlowState::CheckoutOverview, FlowState::Inventory),
];

/// Success of a flow operation carries the state the flow ends in
pub type ActionOutcome = FlowResult<FlowState>;

// =============================================================================
// FLOW STATE
// =============================================================================

/// Logical page the flow occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// Shopping cart
    Cart,
    /// Checkout step one: buyer information
    CheckoutInfo,
    /// Checkout step two: order overview
    CheckoutOverview,
    /// Order confirmation
    CheckoutComplete,
    /// Product listing
    Inventory,
}

impl FlowState {
    /// Every state
    pub const ALL: [Self; 5] = [
        Self::Cart,
        Self::CheckoutInfo,
        Self::CheckoutOverview,
        Self::CheckoutComplete,
        Self::Inventory,
    ];

    /// State name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::CheckoutInfo => "CheckoutInfo",
            Self::CheckoutOverview => "CheckoutOverview",
            Self::CheckoutComplete => "CheckoutComplete",
            Self::Inventory => "Inventory",
        }
    }

    /// Where `cancel()` leads from this state, if anywhere
    #[must_use]
    pub fn cancel_destination(self) -> Option<Self> {
        CANCEL_ROUTES
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CHECKOUT FORM
// =============================================================================

/// Field of the checkout information form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Postal code
    PostalCode,
}

impl FormField {
    /// Every field, in form order
    pub const ALL: [Self; 3] = [Self::FirstName, Self::LastName, Self::PostalCode];

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::PostalCode => "Postal Code",
        }
    }
}

/// Buyer information. `None` means "leave the field blank".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
}

impl CheckoutForm {
    /// Form with all three fields present
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            postal_code: Some(postal_code.into()),
        }
    }

    /// Form with every field absent
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Set a field
    #[must_use]
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        *self.slot(field) = Some(value.into());
        self
    }

    /// Mark a field absent
    #[must_use]
    pub fn without(mut self, field: FormField) -> Self {
        *self.slot(field) = None;
        self
    }

    /// Value of a field
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::FirstName => self.first_name.as_deref(),
            FormField::LastName => self.last_name.as_deref(),
            FormField::PostalCode => self.postal_code.as_deref(),
        }
    }

    /// Fields that are absent or empty
    #[must_use]
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| self.get(*field).map_or(true, str::is_empty))
            .collect()
    }

    /// All three fields present and non-empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn slot(&mut self, field: FormField) -> &mut Option<String> {
        match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::PostalCode => &mut self.postal_code,
        }
    }
}

// =============================================================================
// CHECKOUT FLOW
// =============================================================================

struct Step {
    to: FlowState,
    fallbacks: usize,
}

impl Step {
    fn new(to: FlowState, paths: &[ClickPath]) -> Self {
        Self {
            to,
            fallbacks: paths.iter().filter(|p| p.is_fallback()).count(),
        }
    }
}

/// Checkout wizard driven over one exclusively owned document
#[derive(Debug)]
pub struct CheckoutFlow<D: Document> {
    id: Uuid,
    document: D,
    config: FlowConfig,
    state: FlowState,
    fallback_clicks: usize,
}

impl<D: Document> CheckoutFlow<D> {
    fn with_state(document: D, config: FlowConfig, state: FlowState) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            document,
            config,
            state,
            fallback_clicks: 0,
        })
    }

    /// Start a flow on a document already showing the information form
    ///
    /// # Errors
    ///
    /// Invalid configuration, or the document is not on the information page.
    pub fn attach(document: D, config: FlowConfig) -> FlowResult<Self> {
        let flow = Self::with_state(document, config, FlowState::CheckoutInfo)?;
        flow.verify("attach", FlowState::CheckoutInfo)?;
        info!(flow = %flow.id, state = %flow.state, "checkout flow attached");
        Ok(flow)
    }

    /// Start a flow from the cart page and enter checkout
    ///
    /// # Errors
    ///
    /// Invalid configuration, the document is not on the cart, or the
    /// checkout entry does not reach the information page.
    pub fn from_cart(document: D, config: FlowConfig) -> FlowResult<Self> {
        let mut flow = Self::with_state(document, config, FlowState::Cart)?;
        flow.verify("from_cart", FlowState::Cart)?;
        info!(flow = %flow.id, state = %flow.state, "checkout flow attached");
        flow.checkout()?;
        Ok(flow)
    }

    /// Flow identifier used in log events
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> FlowState {
        self.state
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// The owned document
    #[must_use]
    pub const fn document(&self) -> &D {
        &self.document
    }

    /// Release the document
    #[must_use]
    pub fn into_document(self) -> D {
        self.document
    }

    /// Scripted click fallbacks used across all transitions so far
    #[must_use]
    pub const fn fallback_clicks(&self) -> usize {
        self.fallback_clicks
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Cart → CheckoutInfo
    pub fn checkout(&mut self) -> ActionOutcome {
        self.transition("checkout", |flow| {
            flow.expect_state("checkout", FlowState::Cart)?;
            let path = CartPage::new(&flow.document, &flow.config).checkout()?;
            flow.verify("checkout", FlowState::CheckoutInfo)?;
            Ok(Step::new(FlowState::CheckoutInfo, &[path]))
        })
    }

    /// Enter buyer information and submit.
    ///
    /// A complete form ends in `CheckoutOverview`; a form with an absent or
    /// empty field stays on `CheckoutInfo` with a validation message showing.
    pub fn fill_info(&mut self, form: &CheckoutForm) -> ActionOutcome {
        self.transition("fill_info", |flow| {
            flow.expect_state("fill_info", FlowState::CheckoutInfo)?;
            let info = CheckoutInfoPage::new(&flow.document, &flow.config);
            info.fill(form)?;

            if !form.is_complete() {
                let path = info.submit()?;
                flow.verify("fill_info", FlowState::CheckoutInfo)?;
                debug!(flow = %flow.id, missing = ?form.missing_fields(), "incomplete form submitted");
                return Ok(Step::new(FlowState::CheckoutInfo, &[path]));
            }

            let paths = match flow.config.submit {
                SubmitStrategy::Ui => vec![info.submit()?],
                SubmitStrategy::DirectNavigation => {
                    flow.navigate(FlowState::CheckoutOverview)?;
                    Vec::new()
                }
            };
            flow.verify("fill_info", FlowState::CheckoutOverview)?;
            Ok(Step::new(FlowState::CheckoutOverview, &paths))
        })
    }

    /// CheckoutOverview → CheckoutComplete
    pub fn finish(&mut self) -> ActionOutcome {
        self.transition("finish", |flow| {
            flow.expect_state("finish", FlowState::CheckoutOverview)?;
            let paths = match flow.config.submit {
                SubmitStrategy::Ui => {
                    vec![CheckoutOverviewPage::new(&flow.document, &flow.config).finish()?]
                }
                SubmitStrategy::DirectNavigation => {
                    flow.navigate(FlowState::CheckoutComplete)?;
                    Vec::new()
                }
            };
            flow.verify("finish", FlowState::CheckoutComplete)?;
            Ok(Step::new(FlowState::CheckoutComplete, &paths))
        })
    }

    /// Leave the wizard: CheckoutInfo → Cart, CheckoutOverview → Inventory
    pub fn cancel(&mut self) -> ActionOutcome {
        self.transition("cancel", |flow| {
            let to = flow
                .state
                .cancel_destination()
                .ok_or_else(|| flow.invalid("cancel"))?;
            let path = match flow.state {
                FlowState::CheckoutInfo => {
                    CheckoutInfoPage::new(&flow.document, &flow.config).cancel()?
                }
                FlowState::CheckoutOverview => {
                    CheckoutOverviewPage::new(&flow.document, &flow.config).cancel()?
                }
                _ => return Err(flow.invalid("cancel")),
            };
            flow.verify("cancel", to)?;
            Ok(Step::new(to, &[path]))
        })
    }

    /// CheckoutComplete → Inventory
    pub fn back_home(&mut self) -> ActionOutcome {
        self.transition("back_home", |flow| {
            flow.expect_state("back_home", FlowState::CheckoutComplete)?;
            let path = CheckoutCompletePage::new(&flow.document, &flow.config).back_home()?;
            flow.verify("back_home", FlowState::Inventory)?;
            Ok(Step::new(FlowState::Inventory, &[path]))
        })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Confirmation header text
    pub fn success_message(&self) -> FlowResult<String> {
        CheckoutCompletePage::new(&self.document, &self.config).success_message()
    }

    /// Validation message: the document's own element first, then its
    /// alternate shape, then a generic message if the information form is
    /// still displayed. Empty when none applies.
    #[must_use]
    pub fn error_message(&self) -> String {
        let info = CheckoutInfoPage::new(&self.document, &self.config);
        match info.error_message() {
            Ok(Some(message)) => return message,
            Ok(None) => {}
            Err(err) => debug!(flow = %self.id, error = %err, "error message lookup failed"),
        }
        if info.check().is_confirmed() {
            GENERIC_VALIDATION_MESSAGE.to_string()
        } else {
            String::new()
        }
    }

    /// Validation message rendered by the document, if any
    pub fn validation_error(&self) -> FlowResult<Option<String>> {
        CheckoutInfoPage::new(&self.document, &self.config).error_message()
    }

    /// Fail with [`FlowError::ValidationError`] if the document shows one
    pub fn require_no_validation_error(&self) -> FlowResult<()> {
        match self.validation_error()? {
            Some(message) => Err(FlowError::ValidationError { message }),
            None => Ok(()),
        }
    }

    /// Whether the information page is displayed
    #[must_use]
    pub fn check_info(&self) -> StateCheck {
        CheckoutInfoPage::new(&self.document, &self.config).check()
    }

    /// Whether the overview page is displayed
    #[must_use]
    pub fn check_overview(&self) -> StateCheck {
        CheckoutOverviewPage::new(&self.document, &self.config).check()
    }

    /// Boolean form of [`Self::check_info`]
    #[must_use]
    pub fn is_on_checkout_info(&self) -> bool {
        self.check_info().is_confirmed()
    }

    /// Boolean form of [`Self::check_overview`]
    #[must_use]
    pub fn is_on_checkout_overview(&self) -> bool {
        self.check_overview().is_confirmed()
    }

    /// Line items on the overview page
    pub fn overview_item_count(&self) -> FlowResult<usize> {
        self.expect_state("overview_item_count", FlowState::CheckoutOverview)?;
        CheckoutOverviewPage::new(&self.document, &self.config).item_count()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn transition<F>(&mut self, operation: &'static str, step: F) -> ActionOutcome
    where
        F: FnOnce(&Self) -> FlowResult<Step>,
    {
        let from = self.state;
        match step(self) {
            Ok(step) => {
                self.state = step.to;
                self.fallback_clicks += step.fallbacks;
                info!(
                    flow = %self.id,
                    operation,
                    from = %from,
                    to = %step.to,
                    fallbacks = step.fallbacks,
                    "checkout transition"
                );
                Ok(step.to)
            }
            Err(err) => {
                warn!(flow = %self.id, operation, state = %from, error = %err, "checkout transition failed");
                Err(err)
            }
        }
    }

    const fn invalid(&self, operation: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            operation,
            state: self.state,
        }
    }

    fn expect_state(&self, operation: &'static str, expected: FlowState) -> FlowResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn navigate(&self, state: FlowState) -> FlowResult<()> {
        let url = self.config.site.url_for(state);
        debug!(flow = %self.id, url = %url, "direct navigation");
        self.document.navigate_to(&url)
    }

    fn verify(&self, step: &str, state: FlowState) -> FlowResult<()> {
        let (doc, config) = (&self.document, &self.config);
        let base = Page::new(doc, config.wait);
        match state {
            FlowState::Cart => base.verify_arrival(step, &CartPage::new(doc, config)),
            FlowState::CheckoutInfo => base.verify_arrival(step, &CheckoutInfoPage::new(doc, config)),
            FlowState::CheckoutOverview => {
                base.verify_arrival(step, &CheckoutOverviewPage::new(doc, config))
            }
            FlowState::CheckoutComplete => {
                base.verify_arrival(step, &CheckoutCompletePage::new(doc, config))
            }
            FlowState::Inventory => base.verify_arrival(step, &InventoryPage::new(doc, config)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockStorefront;
    use crate::result::ErrorKind;
    use crate::wait::WaitPolicy;

    fn config() -> FlowConfig {
        FlowConfig::new().with_wait(
            WaitPolicy::new()
                .with_timeout(200)
                .with_poll_interval(5)
                .with_probe_timeout(30),
        )
    }

    fn info_flow() -> CheckoutFlow<MockStorefront> {
        CheckoutFlow::attach(MockStorefront::default().at(FlowState::CheckoutInfo), config())
            .unwrap()
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(FlowState::CheckoutOverview.to_string(), "CheckoutOverview");
        }

        #[test]
        fn test_cancel_routes() {
            assert_eq!(FlowState::CheckoutInfo.cancel_destination(), Some(FlowState::Cart));
            assert_eq!(
                FlowState::CheckoutOverview.cancel_destination(),
                Some(FlowState::Inventory)
            );
            assert_eq!(FlowState::Cart.cancel_destination(), None);
            assert_eq!(FlowState::CheckoutComplete.cancel_destination(), None);
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn test_complete_form() {
            let form = CheckoutForm::new("John", "Doe", "12345");
            assert!(form.is_complete());
            assert!(form.missing_fields().is_empty());
        }

        #[test]
        fn test_absent_and_empty_are_missing() {
            let form = CheckoutForm::new("John", "", "12345").without(FormField::FirstName);
            assert_eq!(
                form.missing_fields(),
                vec![FormField::FirstName, FormField::LastName]
            );
            assert_eq!(form.get(FormField::LastName), Some(""));
            assert_eq!(form.get(FormField::FirstName), None);
        }

        #[test]
        fn test_with() {
            let form = CheckoutForm::blank()
                .with(FormField::FirstName, "A")
                .with(FormField::LastName, "B")
                .with(FormField::PostalCode, "C");
            assert_eq!(form, CheckoutForm::new("A", "B", "C"));
        }
    }

    mod transition_tests {
        use super::*;

        #[test]
        fn test_attach_requires_info_page() {
            let err = CheckoutFlow::attach(MockStorefront::default(), config()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NavigationMismatch);
        }

        #[test]
        fn test_attach_rejects_bad_config() {
            let bad = config().with_wait(WaitPolicy::new().with_timeout(0));
            let err = CheckoutFlow::attach(MockStorefront::default(), bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }

        #[test]
        fn test_from_cart_enters_checkout() {
            let flow = CheckoutFlow::from_cart(MockStorefront::default(), config()).unwrap();
            assert_eq!(flow.state(), FlowState::CheckoutInfo);
            assert!(flow.is_on_checkout_info());
        }

        #[test]
        fn test_invalid_transition_keeps_state() {
            let mut flow = info_flow();
            let err = flow.finish().unwrap_err();
            assert!(matches!(
                err,
                FlowError::InvalidTransition {
                    operation: "finish",
                    state: FlowState::CheckoutInfo
                }
            ));
            assert_eq!(flow.state(), FlowState::CheckoutInfo);
            assert_eq!(flow.back_home().unwrap_err().kind(), ErrorKind::InvalidTransition);
            assert_eq!(flow.checkout().unwrap_err().kind(), ErrorKind::InvalidTransition);
        }

        #[test]
        fn test_cancel_from_complete_is_invalid() {
            let mut flow = info_flow();
            flow.fill_info(&CheckoutForm::new("John", "Doe", "12345")).unwrap();
            flow.finish().unwrap();
            assert_eq!(flow.cancel().unwrap_err().kind(), ErrorKind::InvalidTransition);
            assert_eq!(flow.state(), FlowState::CheckoutComplete);
        }

        #[test]
        fn test_cancel_then_checkout_again() {
            let mut flow = info_flow();
            assert_eq!(flow.cancel().unwrap(), FlowState::Cart);
            assert_eq!(flow.checkout().unwrap(), FlowState::CheckoutInfo);
        }

        #[test]
        fn test_overview_item_count() {
            let mut flow = info_flow();
            assert_eq!(
                flow.overview_item_count().unwrap_err().kind(),
                ErrorKind::InvalidTransition
            );
            flow.fill_info(&CheckoutForm::new("John", "Doe", "12345")).unwrap();
            assert_eq!(flow.overview_item_count().unwrap(), 2);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_error_message_empty_when_valid() {
            let mut flow = info_flow();
            flow.fill_info(&CheckoutForm::new("John", "Doe", "12345")).unwrap();
            assert_eq!(flow.error_message(), "");
            assert!(flow.require_no_validation_error().is_ok());
        }

        #[test]
        fn test_require_no_validation_error() {
            let mut flow = info_flow();
            flow.fill_info(&CheckoutForm::blank()).unwrap();
            let err = flow.require_no_validation_error().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
            assert!(err.to_string().contains("First Name is required"));
        }

        #[test]
        fn test_check_overview_timed_out_on_info() {
            let flow = info_flow();
            assert_eq!(flow.check_overview(), StateCheck::TimedOut);
            assert!(!flow.is_on_checkout_overview());
        }
    }
}
