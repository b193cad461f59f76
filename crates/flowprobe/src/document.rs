//! Document seam: the capability set consumed from the browsing collaborator.
//!
//! Everything above this module talks to the live page only through
//! [`Document`] and [`Element`]. Implementations:
//!
//! - [`MockStorefront`](crate::MockStorefront): in-memory simulation for tests
//! - `ChromiumDocument` (feature `browser`): CDP via chromiumoxide

use crate::locator::Locator;
use crate::result::FlowResult;

/// Handle to one element of the live document.
///
/// Interaction methods report rejection through
/// [`FlowError::NotInteractable`](crate::FlowError::NotInteractable) or
/// [`FlowError::StaleElement`](crate::FlowError::StaleElement) so that callers
/// can tell an intercepted click from a broken session.
pub trait Element {
    /// Native click (subject to hit-testing)
    fn click(&self) -> FlowResult<()>;

    /// Clear the element's value
    fn clear(&self) -> FlowResult<()>;

    /// Send text to the element
    fn send_text(&self, text: &str) -> FlowResult<()>;

    /// Rendered text content
    fn text(&self) -> FlowResult<String>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self) -> FlowResult<bool>;

    /// Whether the element accepts interaction
    fn is_enabled(&self) -> FlowResult<bool>;

    /// Attribute value, `None` when absent
    fn attribute(&self, name: &str) -> FlowResult<Option<String>>;
}

/// A live document/session handle.
pub trait Document {
    /// Element handle type
    type Element: Element;

    /// Navigate to URL
    fn navigate_to(&self, url: &str) -> FlowResult<()>;

    /// Get current location
    fn current_location(&self) -> FlowResult<String>;

    /// First element matching the locator, `None` when nothing matches
    fn find_element(&self, locator: &Locator) -> FlowResult<Option<Self::Element>>;

    /// All elements matching the locator, in document order
    fn find_elements(&self, locator: &Locator) -> FlowResult<Vec<Self::Element>>;

    /// Execute a raw script; `arguments[i]` refers to `args[i]`
    fn execute_script(&self, script: &str, args: &[&Self::Element])
        -> FlowResult<serde_json::Value>;
}
