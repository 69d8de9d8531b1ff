//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use saucecheck::SuiteKind;
use std::path::PathBuf;

/// Environment variable holding the Sheets bearer token
pub const TOKEN_ENV: &str = "SAUCECHECK_SHEETS_TOKEN";

/// Saucecheck: storefront and REST contract suites for the Swag Labs demo
#[derive(Parser, Debug)]
#[command(name = "saucecheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only failures and errors)
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
    /// Run suites and write the report
    Run(RunArgs),

    /// Push a report's outcomes into the tracking spreadsheet
    Sync(SyncArgs),

    /// Show the effective suite configuration and test data
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite to run
    #[arg(short, long, default_value = "all")]
    pub suite: SuiteArg,

    /// Storefront to drive
    #[arg(short, long, default_value = "simulator")]
    pub target: TargetArg,

    /// Only run cases whose title or group contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Cases run concurrently
    #[arg(short = 'j', long, default_value = "1")]
    pub workers: usize,

    /// Write the JSON report here
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Suite configuration (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Accounts, customer and search terms (YAML)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium binary
    #[arg(long)]
    pub chromium: Option<String>,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Report produced by `saucecheck run`
    #[arg(short, long)]
    pub report: PathBuf,

    /// Sheet location (JSON or YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// OAuth bearer token for the Sheets API
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Sheets API endpoint
    #[arg(long, default_value = saucecheck::sync::SHEETS_API_BASE)]
    pub sheets_url: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Suite configuration (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Test data (YAML)
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

/// Which suites to run
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuiteArg {
    /// Page-by-page UI cases
    Ui,
    /// Purchase scenario
    BuyItem,
    /// REST contract cases
    Api,
    /// Every suite
    #[default]
    All,
}

impl SuiteArg {
    /// Suites selected, in run order
    #[must_use]
    pub fn kinds(self) -> Vec<SuiteKind> {
        match self {
            Self::Ui => vec![SuiteKind::Ui],
            Self::BuyItem => vec![SuiteKind::BuyItem],
            Self::Api => vec![SuiteKind::Api],
            Self::All => SuiteKind::ALL.to_vec(),
        }
    }
}

/// Storefront the UI suites drive
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetArg {
    /// In-memory storefront
    #[default]
    Simulator,
    /// Live site in chromium (needs the `browser` feature)
    Browser,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["saucecheck", "run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.suite, SuiteArg::All);
        assert_eq!(args.target, TargetArg::Simulator);
        assert_eq!(args.workers, 1);
        assert!(args.report.is_none());
    }

    #[test]
    fn test_suite_names_are_kebab_case() {
        let cli = Cli::parse_from(["saucecheck", "run", "--suite", "buy-item", "-f", "TC-0"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.suite.kinds(), [SuiteKind::BuyItem]);
        assert_eq!(args.filter.as_deref(), Some("TC-0"));
    }

    #[test]
    fn test_all_runs_every_suite_in_order() {
        assert_eq!(
            SuiteArg::All.kinds(),
            [SuiteKind::Ui, SuiteKind::BuyItem, SuiteKind::Api]
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["saucecheck", "config", "-vv", "--color", "never"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(ColorChoice::from(cli.color), ColorChoice::Never);
    }

    #[test]
    fn test_sync_token_flag() {
        let cli = Cli::parse_from([
            "saucecheck", "sync", "-r", "report.json", "-c", "sheet.json", "--token", "abc",
        ]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.token.as_deref(), Some("abc"));
        assert_eq!(args.sheets_url, saucecheck::sync::SHEETS_API_BASE);
    }
}
