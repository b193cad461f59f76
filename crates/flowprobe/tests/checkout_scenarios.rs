//! End-to-end checkout scenarios against the simulated storefront
//!
//! Scenarios A-E cover the wizard's happy path, validation, completion and
//! both cancellation branches. The fault section replays the timing and
//! rendering problems the flow must absorb or report.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use flowprobe::prelude::*;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn config() -> FlowConfig {
    FlowConfig::new().with_wait(
        WaitPolicy::new()
            .with_timeout(500)
            .with_poll_interval(5)
            .with_probe_timeout(50),
    )
}

fn john_doe() -> CheckoutForm {
    CheckoutForm::new("John", "Doe", "12345")
}

fn flow_on(store: &MockStorefront) -> CheckoutFlow<MockStorefront> {
    CheckoutFlow::from_cart(store.clone(), config()).expect("cart should lead to checkout")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_valid_info_reaches_overview() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    assert_eq!(flow.fill_info(&john_doe()).unwrap(), FlowState::CheckoutOverview);
    assert!(flow.is_on_checkout_overview());
    assert_eq!(flow.error_message(), "");
    assert!(store.location().contains("checkout-step-two"));
}

#[test]
fn test_scenario_b_missing_first_name_stays_on_info() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    let form = john_doe().without(FormField::FirstName);
    assert_eq!(flow.fill_info(&form).unwrap(), FlowState::CheckoutInfo);
    assert!(flow.is_on_checkout_info());
    let message = flow.error_message();
    assert!(!message.is_empty());
    assert!(message.contains("First Name is required"));
}

#[test]
fn test_scenario_c_finish_shows_confirmation() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe()).unwrap();
    assert_eq!(flow.finish().unwrap(), FlowState::CheckoutComplete);
    let message = flow.success_message().unwrap();
    assert!(message.to_uppercase().contains("THANK YOU FOR YOUR ORDER"));
}

#[test]
fn test_scenario_d_cancel_from_info_returns_to_cart() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    assert_eq!(flow.cancel().unwrap(), FlowState::Cart);
    assert_eq!(store.state(), Some(FlowState::Cart));
}

#[test]
fn test_scenario_e_cancel_from_overview_returns_to_inventory() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe()).unwrap();
    assert_eq!(flow.cancel().unwrap(), FlowState::Inventory);
    assert_eq!(store.state(), Some(FlowState::Inventory));
}

#[test]
fn test_back_home_after_completion() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe()).unwrap();
    flow.finish().unwrap();
    assert_eq!(flow.back_home().unwrap(), FlowState::Inventory);
    assert_eq!(store.state(), Some(FlowState::Inventory));
}

#[test]
fn test_each_missing_field_reports_its_own_message() {
    for (field, label) in [
        (FormField::FirstName, "First Name"),
        (FormField::LastName, "Last Name"),
        (FormField::PostalCode, "Postal Code"),
    ] {
        let store = MockStorefront::default();
        let mut flow = flow_on(&store);
        flow.fill_info(&john_doe().without(field)).unwrap();
        assert!(flow.error_message().contains(label), "{label}");
        assert_eq!(flow.state(), FlowState::CheckoutInfo);
    }
}

#[test]
fn test_empty_string_counts_as_missing() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    let form = john_doe().with(FormField::PostalCode, "");
    assert_eq!(flow.fill_info(&form).unwrap(), FlowState::CheckoutInfo);
    assert!(flow.error_message().contains("Postal Code"));
}

#[test]
fn test_retry_after_validation_error() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);

    flow.fill_info(&CheckoutForm::blank()).unwrap();
    assert!(!flow.error_message().is_empty());
    assert_eq!(flow.fill_info(&john_doe()).unwrap(), FlowState::CheckoutOverview);
    assert_eq!(flow.overview_item_count().unwrap(), 2);
}

#[test]
fn test_attach_on_info_page() {
    let store = MockStorefront::default().at(FlowState::CheckoutInfo);
    let flow = CheckoutFlow::attach(store, config()).unwrap();
    assert_eq!(flow.state(), FlowState::CheckoutInfo);
    assert_eq!(flow.check_info(), StateCheck::Confirmed);
}

#[test]
fn test_direct_navigation_strategy() {
    let store = MockStorefront::default();
    let config = config().with_submit(SubmitStrategy::DirectNavigation);
    let mut flow = CheckoutFlow::from_cart(store.clone(), config).unwrap();

    flow.fill_info(&john_doe()).unwrap();
    flow.finish().unwrap();
    assert_eq!(flow.state(), FlowState::CheckoutComplete);
    let history = store.history();
    assert!(history.iter().any(|h| h.ends_with("checkout-step-two.html")));
    assert!(history.iter().any(|h| h.ends_with("checkout-complete.html")));
    assert!(!history.iter().any(|h| h == "click:#finish"));
}

#[test]
fn test_direct_navigation_still_validates_via_ui() {
    let store = MockStorefront::default();
    let config = config().with_submit(SubmitStrategy::DirectNavigation);
    let mut flow = CheckoutFlow::from_cart(store.clone(), config).unwrap();

    let form = john_doe().without(FormField::LastName);
    assert_eq!(flow.fill_info(&form).unwrap(), FlowState::CheckoutInfo);
    assert!(store.history().iter().any(|h| h == "click:#continue"));
}

// ============================================================================
// Fault injection
// ============================================================================

#[test]
fn test_render_delay_is_absorbed_by_waits() {
    let store = MockStorefront::default()
        .with_faults(Faults::new().with_render_delay(Duration::from_millis(30)));
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe()).unwrap();
    flow.finish().unwrap();
    assert!(flow.success_message().unwrap().contains("Thank you"));
}

#[test]
fn test_intercepted_clicks_use_scripted_fallback() {
    let store = MockStorefront::default()
        .with_faults(Faults::new().with_intercepted_clicks(2));
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe()).unwrap();
    assert_eq!(flow.state(), FlowState::CheckoutOverview);
    assert_eq!(flow.fallback_clicks(), 2);
    assert_eq!(store.scripted_clicks(), 2);
}

#[test]
fn test_failed_fallback_surfaces_intercepted_and_keeps_state() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);
    store.set_faults(
        Faults::new()
            .with_intercepted_clicks(1)
            .with_failing_scripts(),
    );

    let err = flow.fill_info(&john_doe()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Intercepted);
    match &err {
        FlowError::Intercepted {
            locator, location, ..
        } => {
            assert_eq!(locator, "#continue");
            assert!(location.contains("checkout-step-one"));
        }
        other => panic!("expected intercepted, got {other:?}"),
    }
    assert!(err.to_string().contains("checkout-step-one"));
    assert_eq!(flow.state(), FlowState::CheckoutInfo);
}

#[test]
fn test_stalled_navigation_is_a_mismatch() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);
    store.set_faults(Faults::new().with_stalled_navigation());

    match flow.fill_info(&john_doe()).unwrap_err() {
        FlowError::NavigationMismatch {
            step,
            expected,
            location,
        } => {
            assert_eq!(step, "fill_info");
            assert_eq!(expected, "checkout-step-two.html");
            assert!(location.contains("checkout-step-one"));
        }
        other => panic!("expected navigation mismatch, got {other:?}"),
    }
    assert_eq!(flow.state(), FlowState::CheckoutInfo);
}

#[test]
fn test_hidden_success_header_times_out() {
    let store = MockStorefront::default()
        .with_faults(Faults::new().with_hidden_success_header());
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe()).unwrap();
    match flow.finish().unwrap_err() {
        FlowError::Timeout {
            waited_for,
            last_location,
            ..
        } => {
            assert!(waited_for.contains(".complete-header"));
            assert!(last_location.contains("checkout-complete"));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(flow.state(), FlowState::CheckoutOverview);
}

#[test]
fn test_alternate_error_element() {
    let store = MockStorefront::default()
        .with_faults(Faults::new().with_error_shape(ErrorShape::Alternate));
    let mut flow = flow_on(&store);

    flow.fill_info(&john_doe().without(FormField::LastName)).unwrap();
    assert_eq!(flow.error_message(), "Error: Last Name is required");
}

#[test]
fn test_missing_error_element_synthesizes_message() {
    let store = MockStorefront::default()
        .with_faults(Faults::new().with_error_shape(ErrorShape::Missing));
    let mut flow = flow_on(&store);

    flow.fill_info(&CheckoutForm::blank()).unwrap();
    assert_eq!(flow.error_message(), GENERIC_VALIDATION_MESSAGE);
    assert!(flow.require_no_validation_error().is_ok());
}

#[test]
fn test_error_message_empty_off_info_page() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);
    flow.fill_info(&john_doe()).unwrap();
    flow.finish().unwrap();
    assert_eq!(flow.error_message(), "");
}

#[test]
fn test_state_check_unexpected_location() {
    let store = MockStorefront::default();
    let flow = flow_on(&store);
    // Same markup, wrong address: the page was reached outside the site map.
    let mismatched = config().with_site(SiteMap {
        info_path: "checkout-step-1.html".to_string(),
        ..SiteMap::default()
    });
    let page = flowprobe::pages::CheckoutInfoPage::new(flow.document(), &mismatched);
    match page.check() {
        StateCheck::Unexpected(detail) => assert!(detail.contains("checkout-step-one")),
        other => panic!("expected unexpected, got {other:?}"),
    }
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_fallback_and_transitions_are_logged() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let store = MockStorefront::default()
            .with_faults(Faults::new().with_intercepted_clicks(1));
        let mut flow = flow_on(&store);
        flow.fill_info(&john_doe()).unwrap();
    });

    let output = logs.contents();
    assert!(output.contains("native click rejected"), "{output}");
    assert!(output.contains("checkout transition"), "{output}");
    assert!(output.contains("to=CheckoutOverview"), "{output}");
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_independent_flows_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let store = MockStorefront::default();
                let mut flow = CheckoutFlow::from_cart(store, config()).unwrap();
                if i % 2 == 0 {
                    flow.fill_info(&john_doe()).unwrap();
                    flow.finish().unwrap()
                } else {
                    flow.cancel().unwrap()
                }
            })
        })
        .collect();

    let states: Vec<FlowState> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        states,
        vec![
            FlowState::CheckoutComplete,
            FlowState::Cart,
            FlowState::CheckoutComplete,
            FlowState::Cart
        ]
    );
}

#[test]
fn test_flow_moves_across_threads() {
    let store = MockStorefront::default();
    let mut flow = flow_on(&store);
    flow.fill_info(&john_doe()).unwrap();
    let flow = std::thread::spawn(move || {
        let mut flow = flow;
        flow.finish().unwrap();
        flow
    })
    .join()
    .unwrap();
    assert_eq!(flow.state(), FlowState::CheckoutComplete);
}
