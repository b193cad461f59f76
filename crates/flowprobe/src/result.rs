//! Result and error types for Flowprobe.

use crate::flow::FlowState;
use thiserror::Error;

/// Result type for Flowprobe operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Fieldless classification of a [`FlowError`], convenient for matching in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A wait's predicate never held within budget
    Timeout,
    /// Interaction target present but not actionable, fallback also failed
    Intercepted,
    /// The document rejected submitted form data
    ValidationError,
    /// Post-transition location/marker check failed
    NavigationMismatch,
    /// Operation not defined for the current flow state
    InvalidTransition,
    /// Element lookup error
    ElementNotFound,
    /// Element reference no longer attached to the document
    StaleElement,
    /// Element exists but cannot receive the interaction
    NotInteractable,
    /// Scripted invocation failed
    Script,
    /// Session/transport failure
    Driver,
    /// Invalid configuration
    Config,
    /// I/O or (de)serialization failure
    Io,
}

/// Errors that can occur in Flowprobe
#[derive(Debug, Error)]
pub enum FlowError {
    /// A wait exhausted its budget
    #[error(
        "Timed out after {timeout_ms}ms waiting for {waited_for} (last location: {last_location}, last observed: {last_observed})"
    )]
    Timeout {
        /// What was awaited
        waited_for: String,
        /// Budget in milliseconds
        timeout_ms: u64,
        /// Location observed when the budget ran out
        last_location: String,
        /// Last probe outcome
        last_observed: String,
    },

    /// Native and scripted interaction both rejected
    #[error("Interaction with {locator} intercepted at {location}: {message}")]
    Intercepted {
        /// Locator of the target element
        locator: String,
        /// Location observed after both paths failed
        location: String,
        /// Error message
        message: String,
    },

    /// Document-surfaced validation message
    #[error("Validation error: {message}")]
    ValidationError {
        /// Message rendered by the document
        message: String,
    },

    /// Arrival verification failed after a transition
    #[error("Navigation mismatch during {step}: expected location containing {expected:?}, found {location:?}")]
    NavigationMismatch {
        /// Verification step that failed
        step: String,
        /// Expected location fragment
        expected: String,
        /// Observed location
        location: String,
    },

    /// Transition invoked from a state without that edge
    #[error("Invalid transition: {operation} is not available from {state}")]
    InvalidTransition {
        /// Operation attempted
        operation: &'static str,
        /// State at invocation time
        state: FlowState,
    },

    /// No element matched the locator
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator that matched nothing
        locator: String,
    },

    /// Element reference went stale
    #[error("Stale element reference: {locator}")]
    StaleElement {
        /// Locator the handle came from
        locator: String,
    },

    /// Element rejected the interaction (overlay, animation, disabled)
    #[error("Element not interactable: {message}")]
    NotInteractable {
        /// Error message
        message: String,
    },

    /// Script execution error
    #[error("Script execution failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Driver/session error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not-interactable error
    #[must_use]
    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::NotInteractable {
            message: message.into(),
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Intercepted { .. } => ErrorKind::Intercepted,
            Self::ValidationError { .. } => ErrorKind::ValidationError,
            Self::NavigationMismatch { .. } => ErrorKind::NavigationMismatch,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            Self::StaleElement { .. } => ErrorKind::StaleElement,
            Self::NotInteractable { .. } => ErrorKind::NotInteractable,
            Self::Script { .. } => ErrorKind::Script,
            Self::Driver { .. } => ErrorKind::Driver,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io(_) | Self::Yaml(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    /// Whether a poll loop should treat this error as "not yet" and keep polling
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::StaleElement { .. }
                | Self::NotInteractable { .. }
                | Self::Intercepted { .. }
        )
    }
}
