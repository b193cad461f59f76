//! Page Object Model Support
//!
//! A page object wraps one logical page of the storefront behind named,
//! intention-revealing operations. Concrete pages live in [`crate::pages`];
//! this module holds the shared contract and the base [`Page`] they compose.
//!
//! ## Toyota Way Application:
//! - **Poka-Yoke**: Locators are page constants, never ad-hoc strings at call sites
//! - **Muda**: Waiting and fallback logic live once, in the base page
//! - **Genchi Genbutsu**: State checks look at the live location, not at flow bookkeeping

use crate::action::{ActionExecutor, ClickPath};
use crate::document::Document;
use crate::locator::Locator;
use crate::result::{FlowError, FlowResult};
use crate::wait::{WaitEngine, WaitPolicy};
use std::fmt;
use tracing::debug;

/// Trait for page objects representing one page of the flow.
pub trait PageObject {
    /// Page name for logging/debugging
    fn page_name(&self) -> &'static str;

    /// Location fragment that identifies this page
    fn url_marker(&self) -> &str;

    /// Element whose presence defines this page
    fn marker(&self) -> &Locator;
}

/// Three-valued outcome of a state query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCheck {
    /// Marker present and location matches
    Confirmed,
    /// Marker never appeared within the probe budget
    TimedOut,
    /// Marker present with a mismatched location, or the probe failed
    Unexpected(String),
}

impl StateCheck {
    /// Collapse to a boolean
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for StateCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Unexpected(detail) => write!(f, "unexpected: {detail}"),
        }
    }
}

/// Base page: a document handle plus the wait policy of the flow that owns it
#[derive(Debug)]
pub struct Page<'a, D: Document> {
    actions: ActionExecutor<'a, D>,
}

impl<'a, D: Document> Page<'a, D> {
    /// Create a base page
    #[must_use]
    pub const fn new(document: &'a D, policy: WaitPolicy) -> Self {
        Self {
            actions: ActionExecutor::new(document, policy),
        }
    }

    /// The document handle
    #[must_use]
    pub const fn document(&self) -> &'a D {
        self.actions.waits().document()
    }

    /// Wait policy in effect
    #[must_use]
    pub const fn policy(&self) -> WaitPolicy {
        self.actions.waits().policy()
    }

    /// Wait engine with page-default timeouts
    #[must_use]
    pub const fn waits(&self) -> &WaitEngine<'a, D> {
        self.actions.waits()
    }

    /// Action executor with page-default timeouts
    #[must_use]
    pub const fn actions(&self) -> &ActionExecutor<'a, D> {
        &self.actions
    }

    /// First element matching the locator, without waiting
    pub fn find_one(&self, locator: &Locator) -> FlowResult<D::Element> {
        self.document()
            .find_element(locator)?
            .ok_or_else(|| FlowError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    /// All elements matching the locator, without waiting
    pub fn find_all(&self, locator: &Locator) -> FlowResult<Vec<D::Element>> {
        self.document().find_elements(locator)
    }

    /// Click with the default timeout
    pub fn click(&self, locator: &Locator) -> FlowResult<ClickPath> {
        self.actions.click(locator)
    }

    /// Type with the default timeout
    pub fn type_text(&self, locator: &Locator, text: &str) -> FlowResult<()> {
        self.actions.type_text(locator, text)
    }

    /// Visible text with the default timeout
    pub fn text_of(&self, locator: &Locator) -> FlowResult<String> {
        self.actions.text(locator)
    }

    /// Visible, non-empty text within the probe budget; `None` if it never shows
    pub fn probe_text(&self, locator: &Locator) -> FlowResult<Option<String>> {
        match self
            .actions
            .text_within(locator, self.policy().probe_timeout_ms)
        {
            Ok(text) if !text.trim().is_empty() => Ok(Some(text)),
            Ok(_) => Ok(None),
            Err(err) if err.is_transient() || matches!(err, FlowError::Timeout { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Probe whether `page` is the one currently displayed
    pub fn check_loaded<P: PageObject + ?Sized>(&self, page: &P) -> StateCheck {
        let marker = page.marker();
        let result = self
            .waits()
            .element_present(marker, self.policy().probe_timeout_ms)
            .and_then(|_| self.document().current_location());
        let check = match result {
            Ok(location) if location.contains(page.url_marker()) => StateCheck::Confirmed,
            Ok(location) => StateCheck::Unexpected(format!(
                "{marker} present but location is {location}, expected {}",
                page.url_marker()
            )),
            Err(FlowError::Timeout { .. }) => StateCheck::TimedOut,
            Err(err) => StateCheck::Unexpected(err.to_string()),
        };
        debug!(page = page.page_name(), check = %check, "state check");
        check
    }

    /// Wait for the location and the marker of `page`
    ///
    /// # Errors
    ///
    /// [`FlowError::NavigationMismatch`] if the location never reaches the
    /// page; [`FlowError::Timeout`] if the location matches but the marker
    /// never becomes visible.
    pub fn verify_arrival<P: PageObject + ?Sized>(&self, step: &str, page: &P) -> FlowResult<()> {
        let timeout_ms = self.policy().timeout_ms;
        match self.waits().url_contains(page.url_marker(), timeout_ms) {
            Ok(_) => {}
            Err(FlowError::Timeout { last_location, .. }) => {
                return Err(FlowError::NavigationMismatch {
                    step: step.to_string(),
                    expected: page.url_marker().to_string(),
                    location: last_location,
                });
            }
            Err(err) => return Err(err),
        }
        self.waits().element_visible(page.marker(), timeout_ms)?;
        debug!(step, page = page.page_name(), "arrival verified");
        Ok(())
    }
}
