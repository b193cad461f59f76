//! Command handlers

use crate::commands::{ConfigArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::runner::{Scenario, ScenarioReport, ScenarioRunner};
use flowprobe::{FlowConfig, MockStorefront, SubmitStrategy};
use std::path::Path;
use tracing::info;

/// Load a flow configuration file, or the defaults when no path is given
pub fn load_flow_config(path: Option<&Path>) -> CliResult<FlowConfig> {
    match path {
        Some(path) => FlowConfig::load(path)
            .map_err(|err| CliError::config(format!("{}: {err}", path.display()))),
        None => Ok(FlowConfig::default()),
    }
}

/// Text printed by `flowprobe config`
pub fn execute_config(args: &ConfigArgs) -> CliResult<String> {
    let config = load_flow_config(args.config.as_deref())?;
    if args.validate {
        let source = args
            .config
            .as_deref()
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
        return Ok(format!("configuration valid: {source}"));
    }
    Ok(config.to_yaml()?)
}

/// Run the checkout scenario described by `args`
///
/// # Errors
///
/// Configuration or connection problems, and [`CliError::ScenarioFailed`]
/// when any step fails.
pub fn execute_run(cli: &CliConfig, args: &RunArgs) -> CliResult<ScenarioReport> {
    let mut flow_config = load_flow_config(args.config.as_deref())?;
    if args.direct_navigation {
        flow_config = flow_config.with_submit(SubmitStrategy::DirectNavigation);
    }

    let reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    let scenario = args.scenario();
    reporter.header("Checkout scenario");
    if cli.verbosity.is_verbose() {
        reporter.info(&format!(
            "base url {} | submit {:?} | timeout {}ms",
            flow_config.site.base_url, flow_config.submit, flow_config.wait.timeout_ms
        ));
    }

    let runner = ScenarioRunner::new(flow_config.clone(), &reporter);
    let report = if args.simulate {
        info!("running against the simulated storefront");
        runner.run(MockStorefront::new(flow_config.site.clone()), &scenario)
    } else {
        let ws_url = args
            .ws_url
            .as_deref()
            .ok_or_else(|| CliError::invalid_argument("--ws-url is required without --simulate"))?;
        run_in_browser(&runner, ws_url, &flow_config, &scenario)?
    };

    if let Some(message) = &report.validation_message {
        reporter.info(&format!("validation message: {message}"));
    }
    if let Some(message) = &report.success_message {
        reporter.info(&format!("success message: {message}"));
    }
    if report.fallback_clicks > 0 {
        reporter.warning(&format!(
            "{} click(s) needed the scripted fallback",
            report.fallback_clicks
        ));
    }
    reporter.summary(report.passed(), report.failed(), report.duration);

    if report.all_passed() {
        Ok(report)
    } else {
        Err(CliError::scenario_failed(format!(
            "{} of {} steps failed",
            report.failed(),
            report.steps.len()
        )))
    }
}

#[cfg(feature = "browser")]
fn run_in_browser(
    runner: &ScenarioRunner<'_>,
    ws_url: &str,
    flow_config: &FlowConfig,
    scenario: &Scenario,
) -> CliResult<ScenarioReport> {
    let session = flowprobe::ChromiumSession::connect(ws_url)?;
    let document = session.open(&flow_config.site.url_for(flowprobe::FlowState::Cart))?;
    Ok(runner.run(document, scenario))
}

#[cfg(not(feature = "browser"))]
fn run_in_browser(
    _runner: &ScenarioRunner<'_>,
    _ws_url: &str,
    _flow_config: &FlowConfig,
    _scenario: &Scenario,
) -> CliResult<ScenarioReport> {
    Err(CliError::invalid_argument(
        "browser support not enabled. Rebuild with --features browser or pass --simulate",
    ))
}
