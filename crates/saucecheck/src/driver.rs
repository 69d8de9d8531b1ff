//! PageDriver - the browser seam.
//!
//! Page models never talk to a browser directly. They issue single,
//! non-waiting operations against a [`PageDriver`]; all waiting is layered
//! on top by [`crate::wait`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Page models (login, inventory, cart, checkout...)           │
//! │                        │                                     │
//! │                 bounded polls (wait)                         │
//! │                        │                                     │
//! │                 PageDriver (trait)                           │
//! │          ┌─────────────┴──────────────┐                      │
//! │   CdpDriver (chromiumoxide)    StoreSimulator (in-memory)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-element operations act on the first match of a locator.

use crate::locator::Locator;
use crate::result::SauceResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Abstract driver for one page context
///
/// One driver instance belongs to exactly one scenario; it is never shared
/// between concurrently running scenarios.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> SauceResult<()>;

    /// Current page URL
    async fn current_url(&self) -> SauceResult<String>;

    /// Number of elements the locator resolves to
    async fn count(&self, locator: &Locator) -> SauceResult<usize>;

    /// Whether the first match exists and is visible
    async fn is_visible(&self, locator: &Locator) -> SauceResult<bool>;

    /// Text content of the first match, `None` when nothing matches
    async fn text_content(&self, locator: &Locator) -> SauceResult<Option<String>>;

    /// Attribute of the first match, `None` when nothing matches or the
    /// attribute is absent
    async fn attribute(&self, locator: &Locator, name: &str) -> SauceResult<Option<String>>;

    /// Current value of the first matching form control
    async fn input_value(&self, locator: &Locator) -> SauceResult<Option<String>>;

    /// Replace the value of the first matching form control
    async fn fill(&self, locator: &Locator, value: &str) -> SauceResult<()>;

    /// Click the first match
    async fn click(&self, locator: &Locator) -> SauceResult<()>;

    /// Choose an option of the first matching `<select>` by value
    async fn select_option(&self, locator: &Locator, value: &str) -> SauceResult<()>;

    /// Release the page context
    async fn close(&self) -> SauceResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for Arc<T> {
    async fn goto(&self, url: &str) -> SauceResult<()> {
        (**self).goto(url).await
    }

    async fn current_url(&self) -> SauceResult<String> {
        (**self).current_url().await
    }

    async fn count(&self, locator: &Locator) -> SauceResult<usize> {
        (**self).count(locator).await
    }

    async fn is_visible(&self, locator: &Locator) -> SauceResult<bool> {
        (**self).is_visible(locator).await
    }

    async fn text_content(&self, locator: &Locator) -> SauceResult<Option<String>> {
        (**self).text_content(locator).await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> SauceResult<Option<String>> {
        (**self).attribute(locator, name).await
    }

    async fn input_value(&self, locator: &Locator) -> SauceResult<Option<String>> {
        (**self).input_value(locator).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        (**self).fill(locator, value).await
    }

    async fn click(&self, locator: &Locator) -> SauceResult<()> {
        (**self).click(locator).await
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        (**self).select_option(locator, value).await
    }

    async fn close(&self) -> SauceResult<()> {
        (**self).close().await
    }
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for Box<T> {
    async fn goto(&self, url: &str) -> SauceResult<()> {
        (**self).goto(url).await
    }

    async fn current_url(&self) -> SauceResult<String> {
        (**self).current_url().await
    }

    async fn count(&self, locator: &Locator) -> SauceResult<usize> {
        (**self).count(locator).await
    }

    async fn is_visible(&self, locator: &Locator) -> SauceResult<bool> {
        (**self).is_visible(locator).await
    }

    async fn text_content(&self, locator: &Locator) -> SauceResult<Option<String>> {
        (**self).text_content(locator).await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> SauceResult<Option<String>> {
        (**self).attribute(locator, name).await
    }

    async fn input_value(&self, locator: &Locator) -> SauceResult<Option<String>> {
        (**self).input_value(locator).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        (**self).fill(locator, value).await
    }

    async fn click(&self, locator: &Locator) -> SauceResult<()> {
        (**self).click(locator).await
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        (**self).select_option(locator, value).await
    }

    async fn close(&self) -> SauceResult<()> {
        (**self).close().await
    }
}
