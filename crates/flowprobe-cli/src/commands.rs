//! CLI command definitions using clap

use crate::runner::{Ending, Scenario};
use clap::{Parser, Subcommand, ValueEnum};
use flowprobe::{CheckoutForm, FormField};
use std::path::PathBuf;

/// Flowprobe: drive a storefront checkout and verify every step
#[derive(Parser, Debug)]
#[command(name = "flowprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a checkout scenario from the cart page
    Run(RunArgs),

    /// Print or validate the flow configuration
    Config(ConfigArgs),
}

/// Arguments for `run`
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// DevTools WebSocket URL of a running chromium
    #[arg(long, env = "FLOWPROBE_WS_URL", required_unless_present = "simulate")]
    pub ws_url: Option<String>,

    /// Run against the built-in simulated storefront instead of a browser
    #[arg(long)]
    pub simulate: bool,

    /// Flow configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// First name to enter
    #[arg(long, default_value = "John")]
    pub first: String,

    /// Last name to enter
    #[arg(long, default_value = "Doe")]
    pub last: String,

    /// Postal code to enter
    #[arg(long, default_value = "12345")]
    pub postal: String,

    /// Leave a field blank to provoke validation (repeatable)
    #[arg(long, value_enum)]
    pub omit: Vec<FieldArg>,

    /// Submit steps by navigating to the next URL instead of clicking
    #[arg(long)]
    pub direct_navigation: bool,

    /// Place the order after the overview
    #[arg(long, conflicts_with = "cancel")]
    pub finish: bool,

    /// Cancel after filling the information form
    #[arg(long)]
    pub cancel: bool,
}

impl RunArgs {
    /// Form built from the field values minus the omitted fields
    #[must_use]
    pub fn form(&self) -> CheckoutForm {
        self.omit.iter().fold(
            CheckoutForm::new(self.first.as_str(), self.last.as_str(), self.postal.as_str()),
            |form, field| form.without((*field).into()),
        )
    }

    /// How the scenario ends after the information step
    #[must_use]
    pub const fn ending(&self) -> Ending {
        if self.finish {
            Ending::Finish
        } else if self.cancel {
            Ending::Cancel
        } else {
            Ending::Overview
        }
    }

    /// The scenario these arguments describe
    #[must_use]
    pub fn scenario(&self) -> Scenario {
        Scenario::new(self.form(), self.ending())
    }
}

/// Arguments for `config`
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file to load (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only validate, print nothing on success but a confirmation
    #[arg(long)]
    pub validate: bool,
}

/// Form field selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldArg {
    /// First name
    First,
    /// Last name
    Last,
    /// Postal code
    Postal,
}

impl From<FieldArg> for FormField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::First => Self::FirstName,
            FieldArg::Last => Self::LastName,
            FieldArg::Postal => Self::PostalCode,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Debug, Clone, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
