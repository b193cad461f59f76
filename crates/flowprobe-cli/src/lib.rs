//! Flowprobe CLI Library
//!
//! Command-line driver for the Flowprobe checkout automation: run a checkout
//! scenario against a live chromium or the simulated storefront, and print
//! or validate flow configuration files.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, FieldArg, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{Mark, ProgressReporter};
pub use runner::{Ending, Scenario, ScenarioReport, ScenarioRunner, StepResult};
