//! Scenario fixtures.
//!
//! A [`Session`] is the scenario-scoped handle: one driver, the suite
//! configuration and the soft-assertion collector. [`Pages`] wires one model
//! per page onto a session, the way every scenario receives them.

use crate::assertion::{AssertionSummary, SoftAssertions};
use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::pages::{
    CartPage, CheckoutCompletePage, CheckoutInformationPage, CheckoutOverviewPage, InventoryPage,
    LoginPage,
};
use crate::result::{SauceError, SauceResult};
use crate::wait::{self, WaitOptions};
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Cart badge shown in the header of every authenticated page
pub const CART_BADGE: &str = "span.shopping_cart_badge";

/// Scenario-scoped driver handle plus soft-failure collector
#[derive(Debug)]
pub struct Session<D> {
    driver: D,
    config: SuiteConfig,
    soft: Mutex<SoftAssertions>,
}

impl<D: PageDriver> Session<D> {
    /// Start a scenario on a fresh driver
    pub fn new(driver: D, config: SuiteConfig) -> Self {
        Self {
            driver,
            config,
            soft: Mutex::new(SoftAssertions::new()),
        }
    }

    /// Underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Suite configuration
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Absolute storefront URL for a path
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// Bound for readiness waits and actions
    pub fn critical(&self) -> WaitOptions {
        self.config.timeouts.critical()
    }

    /// Bound for optional reads
    pub fn probe(&self) -> WaitOptions {
        self.config.timeouts.probe()
    }

    /// One model per page, bound to this session
    pub fn pages(&self) -> Pages<'_, D> {
        Pages::new(self)
    }

    // =========================================================================
    // Soft channel
    // =========================================================================

    fn soft(&self) -> MutexGuard<'_, SoftAssertions> {
        self.soft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a failure unless `condition` holds
    pub fn soft_true(&self, condition: bool, message: &str) {
        self.soft().assert_true(condition, message);
    }

    /// Record a failure unless `actual == expected`
    pub fn soft_eq<T: PartialEq + Debug>(&self, actual: &T, expected: &T, message: &str) {
        self.soft().assert_eq(actual, expected, message);
    }

    /// Record a failure
    pub fn soft_fail(&self, message: impl Into<String>) {
        self.soft().fail(message);
    }

    /// Soft failures recorded so far
    pub fn soft_failure_count(&self) -> usize {
        self.soft().failure_count()
    }

    /// Messages of soft failures recorded so far
    pub fn soft_failures(&self) -> Vec<String> {
        self.soft()
            .failures()
            .iter()
            .map(|f| f.message.clone())
            .collect()
    }

    /// Counts of soft checks
    pub fn soft_summary(&self) -> AssertionSummary {
        self.soft().summary()
    }

    /// End the current case: any soft failure recorded since the last call
    /// fails it. The collector starts over afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SauceError::SoftAssertions`] listing every recorded failure
    pub fn finish(&self) -> SauceResult<()> {
        self.soft().drain().map_err(SauceError::from)
    }

    // =========================================================================
    // Driver shortcuts with the configured bounds
    // =========================================================================

    /// Navigate to an absolute URL
    pub async fn goto(&self, url: &str) -> SauceResult<()> {
        tracing::debug!(url, "goto");
        self.driver.goto(url).await
    }

    /// Current page URL
    pub async fn current_url(&self) -> SauceResult<String> {
        self.driver.current_url().await
    }

    /// Wait until visible (critical)
    pub async fn wait_visible(&self, locator: &Locator) -> SauceResult<()> {
        wait::wait_for_visible(&self.driver, locator, self.critical()).await
    }

    /// Click once visible (critical)
    pub async fn click(&self, locator: &Locator) -> SauceResult<()> {
        wait::click_when_visible(&self.driver, locator, self.critical()).await
    }

    /// Fill once visible (critical)
    pub async fn fill(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        wait::fill_when_visible(&self.driver, locator, value, self.critical()).await
    }

    /// Text of an element that must exist (critical)
    pub async fn text(&self, locator: &Locator) -> SauceResult<String> {
        wait::wait_for_text(&self.driver, locator, self.critical()).await
    }

    /// Current value of a form control that must exist (critical)
    pub async fn input_value(&self, locator: &Locator) -> SauceResult<String> {
        let driver = &self.driver;
        wait::wait_until(self.critical(), locator.to_string(), || async move {
            driver.input_value(locator).await.ok().flatten()
        })
        .await
    }

    /// Attribute of an element that must exist (critical); `None` if the
    /// attribute itself is absent
    pub async fn attribute(&self, locator: &Locator, name: &str) -> SauceResult<Option<String>> {
        wait::wait_for_visible(&self.driver, locator, self.critical()).await?;
        self.driver.attribute(locator, name).await
    }

    /// Number of current matches, no waiting
    pub async fn count(&self, locator: &Locator) -> SauceResult<usize> {
        self.driver.count(locator).await
    }

    /// Visible right now, no waiting
    pub async fn is_visible(&self, locator: &Locator) -> SauceResult<bool> {
        self.driver.is_visible(locator).await
    }

    /// Whether the element shows up within the probe bound
    pub async fn probe_visible(&self, locator: &Locator) -> bool {
        wait::probe_visible(&self.driver, locator, self.probe()).await
    }

    /// Text of the element if it shows up within the probe bound
    pub async fn probe_text(&self, locator: &Locator) -> Option<String> {
        wait::probe_text(&self.driver, locator, self.probe()).await
    }

    /// Number on the cart badge; 0 when the badge is absent
    pub async fn badge_count(&self) -> u32 {
        self.probe_text(&Locator::css(CART_BADGE))
            .await
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Release the driver
    pub async fn close(&self) -> SauceResult<()> {
        self.driver.close().await
    }
}

/// One model instance per page, as handed to each scenario
#[derive(Debug)]
pub struct Pages<'s, D> {
    /// Login page
    pub login: LoginPage<'s, D>,
    /// Product listing
    pub inventory: InventoryPage<'s, D>,
    /// Cart
    pub cart: CartPage<'s, D>,
    /// Checkout step one
    pub checkout_information: CheckoutInformationPage<'s, D>,
    /// Checkout step two
    pub checkout_overview: CheckoutOverviewPage<'s, D>,
    /// Order confirmation
    pub checkout_complete: CheckoutCompletePage<'s, D>,
}

impl<'s, D: PageDriver> Pages<'s, D> {
    /// Bind every model to the session
    pub fn new(session: &'s Session<D>) -> Self {
        Self {
            login: LoginPage::new(session),
            inventory: InventoryPage::new(session),
            cart: CartPage::new(session),
            checkout_information: CheckoutInformationPage::new(session),
            checkout_overview: CheckoutOverviewPage::new(session),
            checkout_complete: CheckoutCompletePage::new(session),
        }
    }
}
