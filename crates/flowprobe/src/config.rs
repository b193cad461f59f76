//! Flow configuration: site map, wait policy and submission strategy.
//!
//! Every field has a default, so a YAML file only needs the keys it changes:
//!
//! ```yaml
//! site:
//!   base_url: http://localhost:8080
//! wait:
//!   timeout_ms: 5000
//! submit: direct_navigation
//! ```

use crate::flow::FlowState;
use crate::result::{FlowError, FlowResult};
use crate::wait::{WaitPolicy, MAX_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default storefront base URL
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// How completed steps are submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStrategy {
    /// Click the page's submit controls
    #[default]
    Ui,
    /// Navigate straight to the next step's URL
    DirectNavigation,
}

/// Where each flow state lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMap {
    /// Base URL of the storefront
    pub base_url: String,
    /// Cart page path
    pub cart_path: String,
    /// Checkout information page path
    pub info_path: String,
    /// Checkout overview page path
    pub overview_path: String,
    /// Checkout complete page path
    pub complete_path: String,
    /// Inventory page path
    pub inventory_path: String,
}

impl Default for SiteMap {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cart_path: "cart.html".to_string(),
            info_path: "checkout-step-one.html".to_string(),
            overview_path: "checkout-step-two.html".to_string(),
            complete_path: "checkout-complete.html".to_string(),
            inventory_path: "inventory.html".to_string(),
        }
    }
}

impl SiteMap {
    /// Site map rooted at a base URL with the default paths
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Location fragment identifying a state
    #[must_use]
    pub fn marker_for(&self, state: FlowState) -> &str {
        match state {
            FlowState::Cart => &self.cart_path,
            FlowState::CheckoutInfo => &self.info_path,
            FlowState::CheckoutOverview => &self.overview_path,
            FlowState::CheckoutComplete => &self.complete_path,
            FlowState::Inventory => &self.inventory_path,
        }
    }

    /// Absolute URL of a state
    #[must_use]
    pub fn url_for(&self, state: FlowState) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.marker_for(state).trim_start_matches('/')
        )
    }

    /// State whose marker appears in `location`, if any
    #[must_use]
    pub fn state_at(&self, location: &str) -> Option<FlowState> {
        FlowState::ALL
            .into_iter()
            .find(|state| location.contains(self.marker_for(*state)))
    }
}

/// Complete flow configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Site map
    pub site: SiteMap,
    /// Wait budgets
    pub wait: WaitPolicy,
    /// Submission strategy
    pub submit: SubmitStrategy,
}

impl FlowConfig {
    /// Create a new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site map
    #[must_use]
    pub fn with_site(mut self, site: SiteMap) -> Self {
        self.site = site;
        self
    }

    /// Set the wait policy
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Set the submission strategy
    #[must_use]
    pub const fn with_submit(mut self, submit: SubmitStrategy) -> Self {
        self.submit = submit;
        self
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> FlowResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> FlowResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> FlowResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check the configuration for values no flow can run with
    pub fn validate(&self) -> FlowResult<()> {
        if self.site.base_url.trim().is_empty() {
            return Err(FlowError::config("site.base_url must not be empty"));
        }
        for state in FlowState::ALL {
            if self.site.marker_for(state).trim().is_empty() {
                return Err(FlowError::config(format!("site path for {state} must not be empty")));
            }
        }
        if self.wait.timeout_ms == 0 {
            return Err(FlowError::config("wait.timeout_ms must be greater than zero"));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(FlowError::config("wait.poll_interval_ms must be greater than zero"));
        }
        if self.wait.poll_interval_ms >= MAX_POLL_INTERVAL_MS {
            return Err(FlowError::config(format!(
                "wait.poll_interval_ms ({}) must be sub-second",
                self.wait.poll_interval_ms
            )));
        }
        if self.wait.poll_interval_ms >= self.wait.timeout_ms {
            return Err(FlowError::config(format!(
                "wait.poll_interval_ms ({}) must be below wait.timeout_ms ({})",
                self.wait.poll_interval_ms, self.wait.timeout_ms
            )));
        }
        Ok(())
    }
}
