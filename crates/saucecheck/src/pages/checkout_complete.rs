//! Order confirmation (`/checkout-complete.html`).

use crate::assertion::ensure;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::locator::Locator;
use crate::page_object::NavigablePage;
use crate::result::SauceResult;

/// Title shown once the order is placed
pub const COMPLETE_TITLE: &str = "Checkout: Complete!";

/// Confirmation header
pub const COMPLETE_HEADER: &str = "Thank you for your order!";

/// Confirmation body
pub const COMPLETE_TEXT: &str =
    "Your order has been dispatched, and will arrive just as fast as the pony can get there!";

const TITLE: &str = "span.title";
const HEADER: &str = ".complete-header";
const BODY: &str = ".complete-text";
const BUTTON_BACK_HOME: &str = "#back-to-products";

/// Terminal confirmation page
#[derive(Debug)]
pub struct CheckoutCompletePage<'s, D> {
    session: &'s Session<D>,
}

impl<'s, D: PageDriver> CheckoutCompletePage<'s, D> {
    /// Bind to a session
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    /// Header text
    pub async fn complete_header_text(&self) -> SauceResult<String> {
        self.session.text(&Locator::css(HEADER)).await
    }

    /// Body text
    pub async fn complete_text(&self) -> SauceResult<String> {
        self.session.text(&Locator::css(BODY)).await
    }

    /// Title text
    pub async fn title_text(&self) -> SauceResult<String> {
        self.session.text(&Locator::css(TITLE)).await
    }

    /// Cart badge number; 0 once the order is placed
    pub async fn cart_count(&self) -> u32 {
        self.session.badge_count().await
    }

    /// Press "Back Home" and require the browser to leave the page
    ///
    /// # Errors
    ///
    /// Fails if the button is missing or the URL does not change
    pub async fn go_to_home_page(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_BACK_HOME)).await?;
        ensure(
            self.wait_until_left().await,
            "Should leave the checkout complete page",
        )
    }
}

impl<'s, D: PageDriver> NavigablePage for CheckoutCompletePage<'s, D> {
    type Driver = D;
    const PATH: &'static str = "/checkout-complete.html";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> Locator {
        Locator::css(TITLE).text_within(COMPLETE_TITLE)
    }

    fn page_name(&self) -> &'static str {
        "checkout-complete"
    }
}
