//! Flowprobe: Resilient Page-Object Automation for Checkout Flows
//!
//! Flowprobe drives a rendered storefront through its multi-step checkout
//! wizard and verifies, at every step, that the document really is where the
//! flow believes it to be.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    FLOWPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌──────────────┐   ┌────────────┐   ┌────────────────┐        │
//! │   │ CheckoutFlow │──►│ PageObject │──►│ ActionExecutor │        │
//! │   │ (states)     │   │ (pages)    │   │ (click/type)   │        │
//! │   └──────────────┘   └────────────┘   └───────┬────────┘        │
//! │                                               ▼                 │
//! │   ┌──────────────┐   ┌────────────┐   ┌────────────────┐        │
//! │   │ Chromium     │◄──│ Document   │◄──│ WaitEngine     │        │
//! │   │ MockStorefront   │ (trait)    │   │ (polling)      │        │
//! │   └──────────────┘   └────────────┘   └────────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use flowprobe::prelude::*;
//!
//! let store = MockStorefront::default();
//! let config = FlowConfig::new().with_wait(WaitPolicy::new().with_timeout(1_000).with_poll_interval(10));
//! let mut flow = CheckoutFlow::from_cart(store, config)?;
//! flow.fill_info(&CheckoutForm::new("John", "Doe", "12345"))?;
//! flow.finish()?;
//! assert!(flow.success_message()?.to_uppercase().contains("THANK YOU"));
//! # Ok::<(), flowprobe::FlowError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod action;
mod browser;
#[allow(clippy::missing_errors_doc)]
mod config;
mod document;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod flow;
mod locator;
#[allow(clippy::missing_errors_doc, clippy::missing_const_for_fn)]
mod mock;
#[allow(clippy::missing_errors_doc)]
mod page_object;
mod result;
#[allow(clippy::missing_errors_doc)]
mod wait;

/// Concrete page objects
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;

pub use action::{ActionExecutor, ClickPath, SCRIPTED_CLICK};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDocument, ChromiumElement, ChromiumSession};
pub use config::{FlowConfig, SiteMap, SubmitStrategy, DEFAULT_BASE_URL};
pub use document::{Document, Element};
pub use flow::{
    ActionOutcome, CheckoutFlow, CheckoutForm, FlowState, FormField, CANCEL_ROUTES,
    GENERIC_VALIDATION_MESSAGE,
};
pub use locator::{Locator, Strategy};
pub use mock::{ErrorShape, Faults, MockElement, MockStorefront, SUCCESS_HEADER_TEXT};
pub use page_object::{Page, PageObject, StateCheck};
pub use result::{ErrorKind, FlowError, FlowResult};
pub use wait::{
    Probe, Satisfied, WaitCondition, WaitEngine, WaitPolicy, WaitSpec, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_WAIT_TIMEOUT_MS, MAX_POLL_INTERVAL_MS,
    MIN_POLL_INTERVAL_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::action::*;
    #[cfg(feature = "browser")]
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::document::*;
    pub use super::flow::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::wait::*;
}
