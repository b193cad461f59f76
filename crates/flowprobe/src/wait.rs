//! Wait Mechanisms
//!
//! Bounded polling of the live document for synchronization.
//!
//! Every wait in the crate goes through [`WaitEngine`]: it evaluates a probe
//! at a fixed interval until the probe reports [`Probe::Ready`] or the budget
//! runs out. There is no unbounded wait and no process-wide timeout; the
//! budget always comes from an explicit [`WaitPolicy`] or [`WaitSpec`].
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Stop on the first non-transient document error
//! - **Poka-Yoke**: Typed wait conditions instead of ad-hoc sleeps
//! - **Genchi Genbutsu**: Timeouts report the last location and last observation

use crate::document::{Document, Element};
use crate::locator::Locator;
use crate::result::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default budget for short probes such as state queries (2 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Lower bound applied to poll intervals to avoid busy-spinning
pub const MIN_POLL_INTERVAL_MS: u64 = 1;

/// Exclusive upper bound accepted for configured poll intervals
pub const MAX_POLL_INTERVAL_MS: u64 = 1_000;

// =============================================================================
// WAIT POLICY
// =============================================================================

/// Wait budgets threaded through every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Default timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Timeout for short probes (state queries, error lookups)
    pub probe_timeout_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl WaitPolicy {
    /// Create a new policy with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set probe timeout in milliseconds
    #[must_use]
    pub const fn with_probe_timeout(mut self, probe_timeout_ms: u64) -> Self {
        self.probe_timeout_ms = probe_timeout_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration, clamped to [`MIN_POLL_INTERVAL_MS`]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    /// Build a spec for a condition using the default timeout
    #[must_use]
    pub fn spec(&self, condition: WaitCondition) -> WaitSpec {
        WaitSpec {
            condition,
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Build a spec for a condition using the probe timeout
    #[must_use]
    pub fn probe_spec(&self, condition: WaitCondition) -> WaitSpec {
        WaitSpec {
            condition,
            timeout_ms: self.probe_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

// =============================================================================
// WAIT CONDITIONS
// =============================================================================

/// Built-in predicate kinds
///
/// Caller-supplied predicates go through [`WaitEngine::until`] and
/// [`WaitEngine::until_true`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// Element is present and displayed
    ElementVisible(Locator),
    /// Element is displayed and enabled
    ElementClickable(Locator),
    /// Element is present in the document
    ElementPresent(Locator),
    /// Current location contains the substring
    UrlContains(String),
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementVisible(loc) => write!(f, "{loc} to be visible"),
            Self::ElementClickable(loc) => write!(f, "{loc} to be clickable"),
            Self::ElementPresent(loc) => write!(f, "{loc} to be present"),
            Self::UrlContains(fragment) => write!(f, "location to contain {fragment:?}"),
        }
    }
}

/// A fully specified, bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    /// What to wait for
    pub condition: WaitCondition,
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

/// Value produced by a satisfied [`WaitSpec`]
#[derive(Debug)]
pub enum Satisfied<E> {
    /// The element that satisfied an element condition
    Element(E),
    /// The location that satisfied a URL condition
    Location(String),
}

/// Outcome of a single probe evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// Condition holds; polling stops with this value
    Ready(T),
    /// Condition does not hold yet; the string describes what was observed
    Pending(String),
}

// =============================================================================
// WAIT ENGINE
// =============================================================================

/// Polls the document until a probe is satisfied or the budget runs out
#[derive(Debug)]
pub struct WaitEngine<'a, D: Document> {
    document: &'a D,
    policy: WaitPolicy,
}

impl<'a, D: Document> WaitEngine<'a, D> {
    /// Create an engine over a document
    #[must_use]
    pub const fn new(document: &'a D, policy: WaitPolicy) -> Self {
        Self { document, policy }
    }

    /// Get the policy
    #[must_use]
    pub const fn policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Get the document
    #[must_use]
    pub const fn document(&self) -> &'a D {
        self.document
    }

    /// Poll `probe` until it is ready or `timeout_ms` elapses.
    ///
    /// Transient probe errors (see [`FlowError::is_transient`]) count as
    /// pending; any other error aborts the wait. A zero timeout evaluates
    /// the probe exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Timeout`] carrying the last location and the last
    /// observation, or the first non-transient probe error.
    pub fn until<T, F>(&self, waited_for: &str, timeout_ms: u64, mut probe: F) -> FlowResult<T>
    where
        F: FnMut(&D) -> FlowResult<Probe<T>>,
    {
        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let poll_interval = self.policy.poll_interval();
        let mut polls: u32 = 0;
        let mut last_observed: String;

        loop {
            polls += 1;
            match probe(self.document) {
                Ok(Probe::Ready(value)) => {
                    debug!(
                        waited_for,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        polls,
                        "wait satisfied"
                    );
                    return Ok(value);
                }
                Ok(Probe::Pending(observed)) => last_observed = observed,
                Err(err) if err.is_transient() => last_observed = err.to_string(),
                Err(err) => return Err(err),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                break;
            }
            std::thread::sleep(poll_interval.min(timeout - elapsed));
        }

        let last_location = self
            .document
            .current_location()
            .unwrap_or_else(|e| format!("<unavailable: {e}>"));
        warn!(
            waited_for,
            timeout_ms,
            polls,
            last_location = %last_location,
            last_observed = %last_observed,
            "wait timed out"
        );
        Err(FlowError::Timeout {
            waited_for: waited_for.to_string(),
            timeout_ms,
            last_location,
            last_observed,
        })
    }

    /// Poll a caller-supplied boolean predicate
    pub fn until_true<F>(&self, waited_for: &str, timeout_ms: u64, mut predicate: F) -> FlowResult<()>
    where
        F: FnMut(&D) -> FlowResult<bool>,
    {
        self.until(waited_for, timeout_ms, |doc| {
            Ok(if predicate(doc)? {
                Probe::Ready(())
            } else {
                Probe::Pending("predicate returned false".to_string())
            })
        })
    }

    /// Run a fully specified wait
    pub fn wait(&self, spec: &WaitSpec) -> FlowResult<Satisfied<D::Element>> {
        let engine = Self::new(
            self.document,
            self.policy.with_poll_interval(spec.poll_interval_ms),
        );
        let waited_for = spec.condition.to_string();
        match &spec.condition {
            WaitCondition::ElementVisible(loc) => engine
                .until(&waited_for, spec.timeout_ms, |doc| probe_visible(doc, loc))
                .map(Satisfied::Element),
            WaitCondition::ElementClickable(loc) => engine
                .until(&waited_for, spec.timeout_ms, |doc| probe_clickable(doc, loc))
                .map(Satisfied::Element),
            WaitCondition::ElementPresent(loc) => engine
                .until(&waited_for, spec.timeout_ms, |doc| probe_present(doc, loc))
                .map(Satisfied::Element),
            WaitCondition::UrlContains(fragment) => engine
                .until(&waited_for, spec.timeout_ms, |doc| {
                    probe_location(doc, fragment)
                })
                .map(Satisfied::Location),
        }
    }

    /// Wait for an element to be visible
    pub fn element_visible(&self, locator: &Locator, timeout_ms: u64) -> FlowResult<D::Element> {
        let waited_for = WaitCondition::ElementVisible(locator.clone()).to_string();
        self.until(&waited_for, timeout_ms, |doc| probe_visible(doc, locator))
    }

    /// Wait for an element to be clickable
    pub fn element_clickable(&self, locator: &Locator, timeout_ms: u64) -> FlowResult<D::Element> {
        let waited_for = WaitCondition::ElementClickable(locator.clone()).to_string();
        self.until(&waited_for, timeout_ms, |doc| probe_clickable(doc, locator))
    }

    /// Wait for an element to be present
    pub fn element_present(&self, locator: &Locator, timeout_ms: u64) -> FlowResult<D::Element> {
        let waited_for = WaitCondition::ElementPresent(locator.clone()).to_string();
        self.until(&waited_for, timeout_ms, |doc| probe_present(doc, locator))
    }

    /// Wait for the location to contain a fragment; returns the location
    pub fn url_contains(&self, fragment: &str, timeout_ms: u64) -> FlowResult<String> {
        let waited_for = WaitCondition::UrlContains(fragment.to_string()).to_string();
        self.until(&waited_for, timeout_ms, |doc| probe_location(doc, fragment))
    }

    /// Wait for the match count of a locator to drop below `before`
    pub fn count_decreased(
        &self,
        locator: &Locator,
        before: usize,
        timeout_ms: u64,
    ) -> FlowResult<usize> {
        let waited_for = format!("{locator} count to drop below {before}");
        self.until(&waited_for, timeout_ms, |doc| {
            let count = doc.find_elements(locator)?.len();
            Ok(if count < before {
                Probe::Ready(count)
            } else {
                Probe::Pending(format!("{count} matching elements"))
            })
        })
    }
}

// =============================================================================
// PROBES
// =============================================================================

fn probe_present<D: Document>(doc: &D, locator: &Locator) -> FlowResult<Probe<D::Element>> {
    Ok(match doc.find_element(locator)? {
        Some(element) => Probe::Ready(element),
        None => Probe::Pending("element not present".to_string()),
    })
}

fn probe_visible<D: Document>(doc: &D, locator: &Locator) -> FlowResult<Probe<D::Element>> {
    Ok(match doc.find_element(locator)? {
        Some(element) if element.is_displayed()? => Probe::Ready(element),
        Some(_) => Probe::Pending("element present but hidden".to_string()),
        None => Probe::Pending("element not present".to_string()),
    })
}

fn probe_clickable<D: Document>(doc: &D, locator: &Locator) -> FlowResult<Probe<D::Element>> {
    Ok(match probe_visible(doc, locator)? {
        Probe::Ready(element) if element.is_enabled()? => Probe::Ready(element),
        Probe::Ready(_) => Probe::Pending("element visible but disabled".to_string()),
        Probe::Pending(observed) => Probe::Pending(observed),
    })
}

fn probe_location<D: Document>(doc: &D, fragment: &str) -> FlowResult<Probe<String>> {
    let location = doc.current_location()?;
    Ok(if location.contains(fragment) {
        Probe::Ready(location)
    } else {
        Probe::Pending(format!("location is {location}"))
    })
}
