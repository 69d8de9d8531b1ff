//! Suite execution against the chosen target

use crate::commands::TargetArg;
use crate::error::{CliError, CliResult};
use saucecheck::api::ApiClient;
use saucecheck::mock::StoreSimulator;
use saucecheck::suite::{api_suite, buy_item_suite, ui_suite, Purchase};
use saucecheck::{
    run_suite, BrowserConfig, ContextFactory, PageDriver, ReportSuite, RunOptions, SauceResult,
    Session, SuiteConfig, SuiteKind, TestData, TestReport, Timeouts,
};
use std::sync::Arc;

/// Runs the selected suites and gathers one report
#[derive(Debug)]
pub struct SuiteRunner {
    config: SuiteConfig,
    data: Arc<TestData>,
    target: TargetArg,
    browser: BrowserConfig,
    options: RunOptions,
}

impl SuiteRunner {
    /// Runner for `target` with default browser settings and options
    #[must_use]
    pub fn new(config: SuiteConfig, data: TestData, target: TargetArg) -> Self {
        Self {
            config,
            data: Arc::new(data),
            target,
            browser: BrowserConfig::default(),
            options: RunOptions::default(),
        }
    }

    /// Set chromium launch settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Set worker count and filter
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Chromium launch settings
    #[must_use]
    pub const fn browser_config(&self) -> &BrowserConfig {
        &self.browser
    }

    /// Run `kinds` in order; each suite becomes one top-level report entry
    pub async fn run(&self, kinds: &[SuiteKind]) -> CliResult<TestReport> {
        let mut report = TestReport::new();
        for &kind in kinds {
            tracing::info!(suite = %kind, target = ?self.target, "running suite");
            let suite = if kind.needs_driver() {
                match self.target {
                    TargetArg::Simulator => self.run_simulated(kind).await,
                    TargetArg::Browser => self.run_in_browser(kind).await?,
                }
            } else {
                self.run_api().await
            };
            report.push(suite);
        }
        Ok(report)
    }

    async fn run_api(&self) -> ReportSuite {
        let config = self.config.clone();
        let clients = move || {
            let client = ApiClient::from_config(&config);
            async move { SauceResult::Ok(client) }
        };
        run_suite(&api_suite(), &clients, &self.options).await
    }

    async fn run_simulated(&self, kind: SuiteKind) -> ReportSuite {
        let config = self.config.clone().with_timeouts(Timeouts::immediate());
        let sessions = move || {
            let store = StoreSimulator::new().with_base_url(config.base_url.clone());
            let session = Session::new(store, config.clone());
            async move { SauceResult::Ok(session) }
        };
        self.run_pages(kind, &sessions).await
    }

    #[cfg(feature = "browser")]
    async fn run_in_browser(&self, kind: SuiteKind) -> CliResult<ReportSuite> {
        use saucecheck::Browser;

        let browser = Arc::new(Browser::launch(self.browser.clone()).await?);
        let config = self.config.clone();
        let sessions = {
            let browser = Arc::clone(&browser);
            move || {
                let browser = Arc::clone(&browser);
                let config = config.clone();
                async move { SauceResult::Ok(Session::new(browser.new_driver().await?, config)) }
            }
        };
        let suite = self.run_pages(kind, &sessions).await;
        drop(sessions);

        match Arc::try_unwrap(browser) {
            Ok(browser) => browser.close().await?,
            Err(_) => tracing::warn!("browser still shared, leaving it to exit with the process"),
        }
        Ok(suite)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_in_browser(&self, _kind: SuiteKind) -> CliResult<ReportSuite> {
        Err(CliError::config(
            "the browser target needs saucecheck-cli built with --features browser",
        ))
    }

    async fn run_pages<D, F>(&self, kind: SuiteKind, sessions: &F) -> ReportSuite
    where
        D: PageDriver + 'static,
        F: ContextFactory<Session<D>>,
    {
        if kind == SuiteKind::BuyItem {
            let data = Arc::clone(&self.data);
            let purchases = move || {
                let data = Arc::clone(&data);
                async move { SauceResult::Ok(Purchase::new(sessions.create().await?, data)) }
            };
            run_suite(&buy_item_suite::<D>(), &purchases, &self.options).await
        } else {
            run_suite(&ui_suite::<D>(&self.data), sessions, &self.options).await
        }
    }
}

/// Error when any spec failed
pub fn verdict(report: &TestReport) -> CliResult<()> {
    let failed = report.failed_count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::suite(format!(
            "{failed} of {} specs failed",
            report.total()
        )))
    }
}
