//! Saucecheck CLI: storefront and REST contract suites
//!
//! ## Usage
//!
//! ```bash
//! saucecheck run --suite ui                        # UI cases on the simulator
//! saucecheck run --target browser --report out.json
//! saucecheck sync --report out.json --config sheet.json
//! saucecheck config                                # effective settings
//! ```

use clap::Parser;
use saucecheck::sync::{sync_report, GoogleSheetsTransport, SyncConfig, SyncContext};
use saucecheck::{BrowserConfig, RunOptions, SuiteConfig, TestData, TestReport};
use saucecheck_cli::{
    verdict, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs, Reporter,
    RunArgs, SuiteRunner, SyncArgs, Verbosity, TOKEN_ENV,
};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &CliConfig) -> CliResult<()> {
    match command {
        Commands::Run(args) => run_suites(config, args).await,
        Commands::Sync(args) => run_sync(config, args).await,
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

/// Logs go to stderr; `RUST_LOG` wins over the flags
fn init_tracing(config: &CliConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.verbosity.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(config.color.should_color())
        .with_target(false)
        .init();
}

fn reporter(config: &CliConfig) -> Reporter {
    Reporter::new(
        config.color.should_color(),
        config.verbosity.is_quiet(),
        config.verbosity.is_verbose(),
    )
}

fn load_suite_config(path: Option<&Path>) -> CliResult<SuiteConfig> {
    Ok(match path {
        Some(path) => SuiteConfig::from_yaml_file(path)?,
        None => SuiteConfig::default(),
    })
}

fn load_test_data(path: Option<&Path>) -> CliResult<TestData> {
    Ok(match path {
        Some(path) => TestData::from_yaml_file(path)?,
        None => TestData::default(),
    })
}

fn browser_config(args: &RunArgs) -> BrowserConfig {
    let mut browser = BrowserConfig::default().with_headless(!args.headed);
    if args.no_sandbox {
        browser = browser.with_no_sandbox();
    }
    if let Some(path) = &args.chromium {
        browser = browser.with_chromium_path(path.clone());
    }
    browser
}

async fn run_suites(config: &CliConfig, args: RunArgs) -> CliResult<()> {
    let suite_config = load_suite_config(args.config.as_deref())?;
    let data = load_test_data(args.data.as_deref())?;

    let mut options = RunOptions::default().with_workers(args.workers);
    if let Some(filter) = &args.filter {
        options = options.with_filter(filter.clone());
    }

    let runner = SuiteRunner::new(suite_config, data, args.target)
        .with_browser(browser_config(&args))
        .with_options(options);
    let reporter = reporter(config);

    let started = Instant::now();
    let report = runner.run(&args.suite.kinds()).await?;
    for suite in &report.suites {
        reporter.suite(suite);
    }
    reporter.summary(&report, started.elapsed());

    if let Some(path) = &args.report {
        report.write(path)?;
        reporter.info(&format!("Report written to {}", path.display()));
    }

    verdict(&report)
}

async fn run_sync(config: &CliConfig, args: SyncArgs) -> CliResult<()> {
    let report = TestReport::read(&args.report)?;
    let sheet = SyncConfig::from_file(&args.config)?;
    let token = args
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| CliError::config(format!("no Sheets token, pass --token or set {TOKEN_ENV}")))?;

    let transport =
        GoogleSheetsTransport::new(sheet.spreadsheet_id.clone(), token).with_base_url(args.sheets_url);
    let context = SyncContext::new(transport, sheet);
    let outcome = sync_report(&context, &report).await;

    let reporter = reporter(config);
    reporter.info(&format!(
        "Updated {} of {} specs ({} cells written)",
        outcome.matched,
        report.total(),
        outcome.written
    ));
    if outcome.failed_writes > 0 {
        reporter.failure(&format!("{} cell writes failed", outcome.failed_writes));
    }
    Ok(())
}

#[derive(Serialize)]
struct EffectiveConfig {
    suite: SuiteConfig,
    data: TestData,
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let effective = EffectiveConfig {
        suite: load_suite_config(args.config.as_deref())?,
        data: load_test_data(args.data.as_deref())?,
    };
    let yaml = serde_yaml_ng::to_string(&effective)
        .map_err(|e| CliError::config(format!("cannot render configuration: {e}")))?;
    print!("{yaml}");
    Ok(())
}
