//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a pure value: a lookup [`Strategy`] plus a selector
//! string. It never holds document state, so it can be stored as a page
//! constant, cloned freely and compared by value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup strategy for locating elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Element `id` attribute
    Id,
    /// Single CSS class name
    ClassName,
    /// CSS selector (e.g., "button.primary")
    Css,
    /// XPath expression
    XPath,
    /// Element `name` attribute
    Name,
    /// `data-test` attribute
    DataTest,
}

impl Strategy {
    /// Short name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ClassName => "class",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Name => "name",
            Self::DataTest => "data-test",
        }
    }
}

/// A locator identifying one element within the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Create a locator from a strategy and a selector
    #[must_use]
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// Locate by `id`
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Strategy::Id, id)
    }

    /// Locate by class name
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, class)
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, expression)
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(Strategy::Name, name)
    }

    /// Locate by `data-test` attribute
    #[must_use]
    pub fn data_test(value: impl Into<String>) -> Self {
        Self::new(Strategy::DataTest, value)
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the raw selector
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Equivalent CSS selector, `None` for XPath locators
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Id => Some(format!("[id={:?}]", self.selector)),
            Strategy::ClassName => Some(format!(".{}", self.selector)),
            Strategy::Css => Some(self.selector.clone()),
            Strategy::XPath => None,
            Strategy::Name => Some(format!("[name={:?}]", self.selector)),
            Strategy::DataTest => Some(format!("[data-test={:?}]", self.selector)),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            Strategy::Id => write!(f, "#{}", self.selector),
            Strategy::ClassName => write!(f, ".{}", self.selector),
            Strategy::Css | Strategy::XPath => write!(f, "{}", self.selector),
            Strategy::Name | Strategy::DataTest => {
                write!(f, "[{}='{}']", self.strategy.as_str(), self.selector)
            }
        }
    }
}
