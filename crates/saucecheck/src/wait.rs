//! Bounded waits.
//!
//! Every UI read or action is preceded by a bounded poll. Two bounds exist:
//!
//! - **critical** (5s): readiness markers and actions. Running out is a
//!   [`SauceError::Timeout`] and fails the scenario.
//! - **probe** (1s): optional reads such as the cart badge or an error
//!   banner. Running out yields `None`, never an error.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{SauceError, SauceResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Bound for navigation, readiness and actions (5 seconds)
pub const CRITICAL_TIMEOUT_MS: u64 = 5_000;

/// Bound for optional reads (1 second)
pub const PROBE_TIMEOUT_MS: u64 = 1_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for a bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Upper bound in milliseconds
    pub timeout_ms: u64,
    /// Delay between attempts in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::critical()
    }
}

impl WaitOptions {
    /// Bound used for readiness waits and actions
    #[must_use]
    pub const fn critical() -> Self {
        Self {
            timeout_ms: CRITICAL_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Bound used for optional reads
    #[must_use]
    pub const fn probe() -> Self {
        Self {
            timeout_ms: PROBE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `attempt` until it yields a value or the bound elapses.
///
/// The attempt always runs at least once, so a zero timeout still observes
/// the current state.
pub async fn poll<T, F, Fut>(options: WaitOptions, mut attempt: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + options.timeout();
    loop {
        if let Some(value) = attempt().await {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Poll and turn exhaustion into a [`SauceError::Timeout`]
pub async fn wait_until<T, F, Fut>(
    options: WaitOptions,
    waited_for: impl Into<String>,
    attempt: F,
) -> SauceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    poll(options, attempt).await.ok_or_else(|| SauceError::Timeout {
        ms: options.timeout_ms,
        waited_for: waited_for.into(),
    })
}

async fn visible<D: PageDriver + ?Sized>(driver: &D, locator: &Locator) -> Option<()> {
    match driver.is_visible(locator).await {
        Ok(true) => Some(()),
        Ok(false) => None,
        Err(err) => {
            tracing::debug!(%locator, %err, "visibility check failed");
            None
        }
    }
}

async fn text<D: PageDriver + ?Sized>(driver: &D, locator: &Locator) -> Option<String> {
    match driver.text_content(locator).await {
        Ok(found) => found,
        Err(err) => {
            tracing::debug!(%locator, %err, "text read failed");
            None
        }
    }
}

// =============================================================================
// CRITICAL HELPERS
// =============================================================================

/// Wait until the locator is visible
pub async fn wait_for_visible<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: WaitOptions,
) -> SauceResult<()> {
    wait_until(options, locator.to_string(), || visible(driver, locator)).await
}

/// Wait until the locator is attached and read its text
pub async fn wait_for_text<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: WaitOptions,
) -> SauceResult<String> {
    wait_until(options, locator.to_string(), || text(driver, locator)).await
}

/// Wait until the locator is visible, then click it
pub async fn click_when_visible<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: WaitOptions,
) -> SauceResult<()> {
    wait_for_visible(driver, locator, options).await?;
    tracing::debug!(%locator, "click");
    driver.click(locator).await
}

/// Wait until the locator is visible, then replace its value
pub async fn fill_when_visible<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    value: &str,
    options: WaitOptions,
) -> SauceResult<()> {
    wait_for_visible(driver, locator, options).await?;
    tracing::debug!(%locator, value, "fill");
    driver.fill(locator, value).await
}

// =============================================================================
// PROBES
// =============================================================================

/// Whether the locator becomes visible within the bound
pub async fn probe_visible<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: WaitOptions,
) -> bool {
    poll(options, || visible(driver, locator)).await.is_some()
}

/// Text of the locator if it appears within the bound
pub async fn probe_text<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: WaitOptions,
) -> Option<String> {
    poll(options, || text(driver, locator)).await
}
