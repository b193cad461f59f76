//! Scenario runner
//!
//! Drives one checkout scenario over any [`Document`]: enter checkout from
//! the cart, fill the information form, then stop on the overview, place
//! the order or cancel. Each step is timed and reported as it completes.

use crate::output::ProgressReporter;
use flowprobe::{CheckoutFlow, CheckoutForm, Document, FlowConfig, FlowResult, FlowState};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// What the scenario does after the information step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    /// Stop on the overview
    #[default]
    Overview,
    /// Place the order
    Finish,
    /// Cancel from wherever the information step left the flow
    Cancel,
}

/// A checkout scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Buyer information to submit
    pub form: CheckoutForm,
    /// Closing step
    pub ending: Ending,
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(form: CheckoutForm, ending: Ending) -> Self {
        Self { form, ending }
    }

    /// State the information step should leave the flow in
    #[must_use]
    pub fn expected_after_info(&self) -> FlowState {
        if self.form.is_complete() {
            FlowState::CheckoutOverview
        } else {
            FlowState::CheckoutInfo
        }
    }
}

/// Step execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Step name
    pub name: String,
    /// Whether the step passed
    pub passed: bool,
    /// Message shown next to the step
    pub detail: String,
    /// Step duration
    pub duration: Duration,
}

impl StepResult {
    /// Create a passing step result
    #[must_use]
    pub fn pass(name: impl Into<String>, detail: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
            duration,
        }
    }

    /// Create a failing step result
    #[must_use]
    pub fn fail(name: impl Into<String>, detail: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
            duration,
        }
    }
}

/// Aggregated scenario results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Steps in execution order
    pub steps: Vec<StepResult>,
    /// State the flow ended in, if it was ever entered
    pub final_state: Option<FlowState>,
    /// Validation message shown by the information page
    pub validation_message: Option<String>,
    /// Confirmation shown after placing the order
    pub success_message: Option<String>,
    /// Scripted click fallbacks used
    pub fallback_clicks: usize,
    /// Total duration
    pub duration: Duration,
}

impl ScenarioReport {
    /// Number of passed steps
    #[must_use]
    pub fn passed(&self) -> usize {
        self.steps.iter().filter(|s| s.passed).count()
    }

    /// Number of failed steps
    #[must_use]
    pub fn failed(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed).count()
    }

    /// Whether every step passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    fn record(&mut self, step: StepResult, reporter: &ProgressReporter) {
        let line = format!("{} ({})", step.name, step.detail);
        if step.passed {
            reporter.success(&line);
        } else {
            reporter.failure(&line);
        }
        self.steps.push(step);
    }
}

/// Runs scenarios and reports their steps
#[derive(Debug)]
pub struct ScenarioRunner<'a> {
    config: FlowConfig,
    reporter: &'a ProgressReporter,
}

impl<'a> ScenarioRunner<'a> {
    /// Create a runner
    #[must_use]
    pub const fn new(config: FlowConfig, reporter: &'a ProgressReporter) -> Self {
        Self { config, reporter }
    }

    /// Run `scenario` on a document showing the cart
    pub fn run<D: Document>(&self, document: D, scenario: &Scenario) -> ScenarioReport {
        let start = Instant::now();
        let mut report = ScenarioReport::default();

        let step = Instant::now();
        let mut flow = match CheckoutFlow::from_cart(document, self.config.clone()) {
            Ok(flow) => flow,
            Err(err) => {
                report.record(
                    StepResult::fail("enter checkout", err.to_string(), step.elapsed()),
                    self.reporter,
                );
                report.duration = start.elapsed();
                return report;
            }
        };
        report.record(
            StepResult::pass("enter checkout", flow.state().to_string(), step.elapsed()),
            self.reporter,
        );

        let info_ok = self.fill_info(&mut flow, scenario, &mut report);
        if info_ok {
            self.close(&mut flow, scenario.ending, &mut report);
        }

        report.final_state = Some(flow.state());
        report.fallback_clicks = flow.fallback_clicks();
        report.duration = start.elapsed();
        report
    }

    fn fill_info<D: Document>(
        &self,
        flow: &mut CheckoutFlow<D>,
        scenario: &Scenario,
        report: &mut ScenarioReport,
    ) -> bool {
        let step = Instant::now();
        let expected = scenario.expected_after_info();
        let result = match flow.fill_info(&scenario.form) {
            Ok(state) if state == expected => {
                if state == FlowState::CheckoutInfo {
                    let message = flow.error_message();
                    let result = StepResult::pass("fill info", message.clone(), step.elapsed());
                    report.validation_message = Some(message);
                    result
                } else {
                    StepResult::pass("fill info", state.to_string(), step.elapsed())
                }
            }
            Ok(state) => StepResult::fail(
                "fill info",
                format!("expected {expected}, flow is on {state}"),
                step.elapsed(),
            ),
            Err(err) => StepResult::fail("fill info", err.to_string(), step.elapsed()),
        };
        let passed = result.passed;
        report.record(result, self.reporter);
        passed
    }

    fn close<D: Document>(
        &self,
        flow: &mut CheckoutFlow<D>,
        ending: Ending,
        report: &mut ScenarioReport,
    ) {
        match ending {
            Ending::Overview => {}
            Ending::Finish if flow.state() != FlowState::CheckoutOverview => {
                self.reporter
                    .warning(&format!("finish skipped: flow stayed on {}", flow.state()));
            }
            Ending::Finish => {
                let step = Instant::now();
                let result = flow.finish().and_then(|_| flow.success_message());
                if let Ok(message) = &result {
                    report.success_message = Some(message.clone());
                }
                report.record(Self::outcome("finish", result, step), self.reporter);
            }
            Ending::Cancel => {
                let step = Instant::now();
                let result = flow.cancel().map(|state| state.to_string());
                report.record(Self::outcome("cancel", result, step), self.reporter);
            }
        }
    }

    fn outcome(name: &str, result: FlowResult<String>, started: Instant) -> StepResult {
        match result {
            Ok(detail) => StepResult::pass(name, detail, started.elapsed()),
            Err(err) => StepResult::fail(name, err.to_string(), started.elapsed()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flowprobe::{Faults, FormField, MockStorefront, WaitPolicy};

    fn config() -> FlowConfig {
        FlowConfig::new().with_wait(
            WaitPolicy::new()
                .with_timeout(300)
                .with_poll_interval(5)
                .with_probe_timeout(30),
        )
    }

    fn john_doe() -> CheckoutForm {
        CheckoutForm::new("John", "Doe", "12345")
    }

    fn run(store: MockStorefront, scenario: &Scenario) -> ScenarioReport {
        let reporter = ProgressReporter::new(false, true);
        ScenarioRunner::new(config(), &reporter).run(store, scenario)
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_expected_after_info() {
            let complete = Scenario::new(john_doe(), Ending::Overview);
            assert_eq!(complete.expected_after_info(), FlowState::CheckoutOverview);
            let partial = Scenario::new(john_doe().without(FormField::LastName), Ending::Finish);
            assert_eq!(partial.expected_after_info(), FlowState::CheckoutInfo);
        }

        #[test]
        fn test_step_result_constructors() {
            assert!(StepResult::pass("a", "", Duration::ZERO).passed);
            assert!(!StepResult::fail("a", "boom", Duration::ZERO).passed);
        }
    }

    mod runner_tests {
        use super::*;

        #[test]
        fn test_stop_on_overview() {
            let report = run(MockStorefront::default(), &Scenario::new(john_doe(), Ending::Overview));
            assert!(report.all_passed());
            assert_eq!(report.passed(), 2);
            assert_eq!(report.final_state, Some(FlowState::CheckoutOverview));
        }

        #[test]
        fn test_finish_records_success_message() {
            let report = run(MockStorefront::default(), &Scenario::new(john_doe(), Ending::Finish));
            assert!(report.all_passed());
            assert_eq!(report.final_state, Some(FlowState::CheckoutComplete));
            assert!(report.success_message.unwrap().contains("Thank you"));
        }

        #[test]
        fn test_cancel_from_overview() {
            let report = run(MockStorefront::default(), &Scenario::new(john_doe(), Ending::Cancel));
            assert!(report.all_passed());
            assert_eq!(report.final_state, Some(FlowState::Inventory));
        }

        #[test]
        fn test_missing_field_passes_with_validation_message() {
            let scenario = Scenario::new(john_doe().without(FormField::FirstName), Ending::Finish);
            let report = run(MockStorefront::default(), &scenario);
            assert!(report.all_passed());
            assert_eq!(report.steps.len(), 2);
            assert_eq!(report.final_state, Some(FlowState::CheckoutInfo));
            assert!(report
                .validation_message
                .unwrap()
                .contains("First Name is required"));
        }

        #[test]
        fn test_cancel_after_validation_returns_to_cart() {
            let scenario = Scenario::new(CheckoutForm::blank(), Ending::Cancel);
            let report = run(MockStorefront::default(), &scenario);
            assert!(report.all_passed());
            assert_eq!(report.final_state, Some(FlowState::Cart));
        }

        #[test]
        fn test_wrong_start_page_fails_first_step() {
            let store = MockStorefront::default().at(FlowState::Inventory);
            let report = run(store, &Scenario::new(john_doe(), Ending::Finish));
            assert_eq!(report.failed(), 1);
            assert_eq!(report.steps.len(), 1);
            assert!(report.final_state.is_none());
        }

        #[test]
        fn test_fallback_clicks_are_reported() {
            let store =
                MockStorefront::default().with_faults(Faults::new().with_intercepted_clicks(1));
            let report = run(store, &Scenario::new(john_doe(), Ending::Overview));
            assert!(report.all_passed());
            assert_eq!(report.fallback_clicks, 1);
        }

        #[test]
        fn test_hidden_success_header_fails_finish() {
            let store = MockStorefront::default()
                .with_faults(Faults::new().with_hidden_success_header());
            let report = run(store, &Scenario::new(john_doe(), Ending::Finish));
            assert_eq!(report.failed(), 1);
            assert!(report.steps[2].detail.contains("Timed out"));
            assert!(report.success_message.is_none());
        }
    }
}
