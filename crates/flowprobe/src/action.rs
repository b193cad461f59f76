//! Action execution with interception fallback.
//!
//! A click first waits for the element to be clickable and tries the native
//! path. Only when the document genuinely rejects it (overlay, animation in
//! flight, stale reference) does the executor invoke the element's click
//! behavior through a script, bypassing hit-testing.

use crate::document::{Document, Element};
use crate::locator::Locator;
use crate::result::{FlowError, FlowResult};
use crate::wait::{WaitEngine, WaitPolicy};
use std::cell::Cell;
use tracing::{debug, warn};

/// Script used by the click fallback
pub const SCRIPTED_CLICK: &str = "arguments[0].click();";

/// Which path a click took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickPath {
    /// Native click accepted
    Native,
    /// Native click rejected, scripted click used
    Scripted,
}

impl ClickPath {
    /// Whether the fallback was needed
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::Scripted)
    }
}

/// Performs clicks and typing on top of a [`WaitEngine`]
#[derive(Debug)]
pub struct ActionExecutor<'a, D: Document> {
    waits: WaitEngine<'a, D>,
    fallbacks: Cell<usize>,
}

impl<'a, D: Document> ActionExecutor<'a, D> {
    /// Create an executor over a document
    #[must_use]
    pub const fn new(document: &'a D, policy: WaitPolicy) -> Self {
        Self {
            waits: WaitEngine::new(document, policy),
            fallbacks: Cell::new(0),
        }
    }

    /// The wait engine backing this executor
    #[must_use]
    pub const fn waits(&self) -> &WaitEngine<'a, D> {
        &self.waits
    }

    /// Number of scripted fallbacks this executor has used
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.get()
    }

    /// Click with the default timeout
    pub fn click(&self, locator: &Locator) -> FlowResult<ClickPath> {
        self.click_within(locator, self.waits.policy().timeout_ms)
    }

    /// Wait for the element to be clickable, click it, fall back to a
    /// scripted click if the native click is rejected.
    ///
    /// # Errors
    ///
    /// [`FlowError::Timeout`] if the element never becomes clickable,
    /// [`FlowError::Intercepted`] if both paths fail.
    pub fn click_within(&self, locator: &Locator, timeout_ms: u64) -> FlowResult<ClickPath> {
        let element = self.waits.element_clickable(locator, timeout_ms)?;
        let primary = match element.click() {
            Ok(()) => {
                debug!(locator = %locator, "native click");
                return Ok(ClickPath::Native);
            }
            Err(err @ (FlowError::NotInteractable { .. } | FlowError::StaleElement { .. })) => err,
            Err(err) => return Err(err),
        };

        let target = if matches!(primary, FlowError::StaleElement { .. }) {
            self.waits
                .document()
                .find_element(locator)?
                .ok_or_else(|| FlowError::ElementNotFound {
                    locator: locator.to_string(),
                })?
        } else {
            element
        };

        warn!(locator = %locator, reason = %primary, "native click rejected, using scripted click");
        self.fallbacks.set(self.fallbacks.get() + 1);
        match self.waits.document().execute_script(SCRIPTED_CLICK, &[&target]) {
            Ok(_) => Ok(ClickPath::Scripted),
            Err(fallback) => {
                let location = self
                    .waits
                    .document()
                    .current_location()
                    .unwrap_or_else(|e| format!("<unavailable: {e}>"));
                Err(FlowError::Intercepted {
                    locator: locator.to_string(),
                    location,
                    message: format!("native click: {primary}; scripted click: {fallback}"),
                })
            }
        }
    }

    /// Wait for the element to be visible, clear it and send `text`
    pub fn type_text(&self, locator: &Locator, text: &str) -> FlowResult<()> {
        let element = self
            .waits
            .element_visible(locator, self.waits.policy().timeout_ms)?;
        element.clear()?;
        if !text.is_empty() {
            element.send_text(text)?;
        }
        debug!(locator = %locator, chars = text.chars().count(), "typed text");
        Ok(())
    }

    /// Wait for the element to be visible and clear it
    pub fn clear(&self, locator: &Locator) -> FlowResult<()> {
        self.type_text(locator, "")
    }

    /// Wait for the element to be visible and return its text
    pub fn text(&self, locator: &Locator) -> FlowResult<String> {
        self.text_within(locator, self.waits.policy().timeout_ms)
    }

    /// Like [`Self::text`] with an explicit budget
    pub fn text_within(&self, locator: &Locator, timeout_ms: u64) -> FlowResult<String> {
        self.waits.element_visible(locator, timeout_ms)?.text()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::flow::{FlowState, FormField};
    use crate::mock::{Faults, MockStorefront};
    use crate::result::ErrorKind;

    fn policy() -> WaitPolicy {
        WaitPolicy::new()
            .with_timeout(200)
            .with_poll_interval(5)
            .with_probe_timeout(30)
    }

    mod click_tests {
        use super::*;

        #[test]
        fn test_native_click() {
            let store = MockStorefront::default();
            let actions = ActionExecutor::new(&store, policy());
            let path = actions.click(&Locator::id("checkout")).unwrap();
            assert_eq!(path, ClickPath::Native);
            assert_eq!(actions.fallback_count(), 0);
            assert_eq!(store.state(), Some(FlowState::CheckoutInfo));
        }

        #[test]
        fn test_intercepted_click_falls_back() {
            let store = MockStorefront::default()
                .with_faults(Faults::new().with_intercepted_clicks(1));
            let actions = ActionExecutor::new(&store, policy());
            let path = actions.click(&Locator::id("checkout")).unwrap();
            assert!(path.is_fallback());
            assert_eq!(actions.fallback_count(), 1);
            assert_eq!(store.scripted_clicks(), 1);
            assert_eq!(store.state(), Some(FlowState::CheckoutInfo));
        }

        #[test]
        fn test_stale_click_relocates_then_falls_back() {
            let store = MockStorefront::default().with_faults(Faults::new().with_stale_clicks(1));
            let actions = ActionExecutor::new(&store, policy());
            let path = actions.click(&Locator::id("checkout")).unwrap();
            assert_eq!(path, ClickPath::Scripted);
            assert_eq!(store.state(), Some(FlowState::CheckoutInfo));
        }

        #[test]
        fn test_no_fallback_when_native_succeeds() {
            let store = MockStorefront::default();
            let actions = ActionExecutor::new(&store, policy());
            actions.click(&Locator::id("checkout")).unwrap();
            assert!(!store.history().iter().any(|h| h.starts_with("script")));
        }

        #[test]
        fn test_click_missing_element_times_out() {
            let store = MockStorefront::default();
            let actions = ActionExecutor::new(&store, policy());
            let err = actions.click_within(&Locator::id("finish"), 20).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Timeout);
        }

        #[test]
        fn test_both_paths_failing_is_intercepted() {
            let store = MockStorefront::default().with_faults(
                Faults::new()
                    .with_intercepted_clicks(1)
                    .with_failing_scripts(),
            );
            let actions = ActionExecutor::new(&store, policy());
            let err = actions.click(&Locator::id("checkout")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Intercepted);
            assert!(err.to_string().contains("#checkout"));
            match err {
                FlowError::Intercepted {
                    location, message, ..
                } => {
                    assert!(location.ends_with("cart.html"));
                    assert!(message.contains("scripted click"));
                }
                other => panic!("expected intercepted, got {other:?}"),
            }
            assert_eq!(store.state(), Some(FlowState::Cart));
        }
    }

    mod type_tests {
        use super::*;

        #[test]
        fn test_type_replaces_existing_value() {
            let store = MockStorefront::default().at(FlowState::CheckoutInfo);
            let actions = ActionExecutor::new(&store, policy());
            let first = Locator::id("first-name");
            actions.type_text(&first, "Jane").unwrap();
            actions.type_text(&first, "John").unwrap();
            assert_eq!(store.field_value(FormField::FirstName), "John");
        }

        #[test]
        fn test_clear() {
            let store = MockStorefront::default().at(FlowState::CheckoutInfo);
            let actions = ActionExecutor::new(&store, policy());
            let postal = Locator::id("postal-code");
            actions.type_text(&postal, "12345").unwrap();
            actions.clear(&postal).unwrap();
            assert_eq!(store.field_value(FormField::PostalCode), "");
        }

        #[test]
        fn test_text() {
            let store = MockStorefront::default().at(FlowState::CheckoutComplete);
            let actions = ActionExecutor::new(&store, policy());
            let text = actions.text(&Locator::class_name("complete-header")).unwrap();
            assert_eq!(text, "Thank you for your order!");
        }
    }
}
