//! Page Object Model support
//!
//! Every page model implements [`NavigablePage`]: a fixed path, a ready
//! marker, and URL validation. A model is *valid* when its ready marker is
//! visible and the current URL, trailing slash removed, equals its expected
//! URL.

use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::locator::Locator;
use crate::result::SauceResult;
use crate::wait;
use async_trait::async_trait;

/// Drop one trailing `/`, if present
#[must_use]
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Shared contract of every page model
///
/// # Example
///
/// ```ignore
/// impl<'s, D: PageDriver> NavigablePage for CartPage<'s, D> {
///     type Driver = D;
///     const PATH: &'static str = "/cart.html";
///
///     fn session(&self) -> &Session<D> {
///         self.session
///     }
///
///     fn ready_marker(&self) -> Locator {
///         Locator::text("Your Cart")
///     }
/// }
/// ```
#[async_trait]
pub trait NavigablePage: Send + Sync {
    /// Driver behind the session
    type Driver: PageDriver;

    /// Path below the storefront origin
    const PATH: &'static str;

    /// Session this model acts on
    fn session(&self) -> &Session<Self::Driver>;

    /// Element whose visibility means the page finished loading
    fn ready_marker(&self) -> Locator;

    /// Page name for logging
    fn page_name(&self) -> &'static str {
        Self::PATH
    }

    /// Expected URL, trailing slash removed
    fn expected_url(&self) -> String {
        strip_trailing_slash(&self.session().url(Self::PATH)).to_string()
    }

    /// Pure URL comparison against the expected URL
    fn matches_url(&self, url: &str) -> bool {
        strip_trailing_slash(url) == self.expected_url()
    }

    /// Block until the ready marker is visible
    ///
    /// # Errors
    ///
    /// Returns [`crate::SauceError::Timeout`] after the critical bound
    async fn wait_until_ready(&self) -> SauceResult<()> {
        self.session().wait_visible(&self.ready_marker()).await
    }

    /// Navigate to the page and wait until it is ready
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails or the page never becomes ready
    async fn goto(&self) -> SauceResult<()> {
        tracing::debug!(page = self.page_name(), "open page");
        self.session().goto(&self.expected_url()).await?;
        self.wait_until_ready().await
    }

    /// Wait until ready, then compare URLs
    ///
    /// # Errors
    ///
    /// Returns [`crate::SauceError::Timeout`] if the page never becomes ready
    async fn is_valid_page(&self) -> SauceResult<bool> {
        self.wait_until_ready().await?;
        Ok(self.is_valid_url().await)
    }

    /// Compare the current URL against the expected one; never fails, an
    /// unreadable URL compares unequal
    async fn is_valid_url(&self) -> bool {
        match self.session().current_url().await {
            Ok(url) => self.matches_url(&url),
            Err(err) => {
                tracing::debug!(page = self.page_name(), %err, "current url unavailable");
                false
            }
        }
    }

    /// Wait (critical bound) for the browser to leave this page; `false`
    /// if it is still here when the bound runs out
    async fn wait_until_left(&self) -> bool {
        let page = self;
        wait::poll(self.session().critical(), || async move {
            (!page.is_valid_url().await).then_some(())
        })
        .await
        .is_some()
    }
}
