//! Saucecheck CLI library
//!
//! Command-line front end for the saucecheck suites: run them against the
//! simulator or a real browser, write the JSON report, push outcomes into
//! the tracking spreadsheet.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, RunArgs, SuiteArg, SyncArgs, TargetArg, TOKEN_ENV,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
pub use runner::{verdict, SuiteRunner};
