//! Cart page (`/cart.html`).

use super::CartListing;
use crate::assertion::ensure;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::item::Item;
use crate::locator::Locator;
use crate::page_object::NavigablePage;
use crate::result::SauceResult;
use rust_decimal::Decimal;

const BUTTON_CHECKOUT: &str = "#checkout";
const BUTTON_CONTINUE_SHOPPING: &str = "#continue-shopping";
const REMOVE_LABEL: &str = "Remove";
const TITLE: &str = ".title";
const TITLE_TEXT: &str = "Your Cart";

/// Cart contents and reconciliation against the scenario's selection
#[derive(Debug)]
pub struct CartPage<'s, D> {
    session: &'s Session<D>,
    listing: CartListing<'s, D>,
}

impl<'s, D: PageDriver> CartPage<'s, D> {
    /// Bind to a session
    pub const fn new(session: &'s Session<D>) -> Self {
        Self {
            session,
            listing: CartListing::new(session),
        }
    }

    /// Number of cart rows
    pub async fn count_items(&self) -> SauceResult<usize> {
        self.listing.count().await
    }

    /// Cart badge number, 0 when absent
    pub async fn cart_count(&self) -> u32 {
        self.session.badge_count().await
    }

    /// Name of the row at `index`
    pub async fn item_name(&self, index: usize) -> SauceResult<String> {
        self.listing.name(index).await
    }

    /// Price of the row at `index`; `None` when the text is not a number
    pub async fn item_price(&self, index: usize) -> SauceResult<Option<Decimal>> {
        self.listing.price(index).await
    }

    /// Every row as name and price
    pub async fn items(&self) -> SauceResult<Vec<Item>> {
        self.listing.items().await
    }

    /// Press "Remove" on the row at `index`
    ///
    /// # Errors
    ///
    /// Fails if the button is not visible within the critical bound
    pub async fn remove_item(&self, index: usize) -> SauceResult<()> {
        self.session
            .click(&CartListing::<D>::entry(index).button_within(REMOVE_LABEL))
            .await
    }

    /// Remove every row, last first
    ///
    /// # Errors
    ///
    /// Fails if a remove button is missing
    pub async fn remove_all_items(&self) -> SauceResult<()> {
        let count = self.count_items().await?;
        for index in (0..count).rev() {
            self.remove_item(index).await?;
        }
        tracing::debug!(removed = count, "emptied cart");
        Ok(())
    }

    /// Reconcile the cart with `expected`.
    ///
    /// Each expected item missing from the cart is a soft failure, and one
    /// stray row is removed so later count checks run against a consistent
    /// cart. The stray removed is the first displayed row that matches no
    /// expected item, scanning from the top; rows that do match are never
    /// touched, unlike removing whichever row a scan happened to end on.
    ///
    /// # Errors
    ///
    /// Fails if a row cannot be read or removed
    pub async fn adjust_cart_item(&self, expected: &[Item]) -> SauceResult<()> {
        for item in expected {
            if self.listing.find(item).await?.is_some() {
                continue;
            }
            self.session
                .soft_fail(format!("Item {item} should be in the cart"));

            match self.first_unexpected(expected).await? {
                Some(index) => {
                    let stray = self.item_name(index).await?;
                    tracing::warn!(%item, %stray, "removing unmatched cart entry");
                    self.remove_item(index).await?;
                }
                None => tracing::debug!(%item, "no unmatched cart entry to remove"),
            }
        }
        Ok(())
    }

    /// Index of the first row that matches none of `expected`
    async fn first_unexpected(&self, expected: &[Item]) -> SauceResult<Option<usize>> {
        let count = self.count_items().await?;
        for index in 0..count {
            let name = self.item_name(index).await?;
            let price = self.item_price(index).await?;
            let known = price.is_some_and(|price| expected.iter().any(|e| e.matches(&name, price)));
            if !known {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Whether every expected item is in the cart; no mutation, no soft
    /// failures
    pub async fn is_cart_match_cart_item(&self, expected: &[Item]) -> SauceResult<bool> {
        for item in expected {
            if self.listing.find(item).await?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether the badge number equals the number of rows
    pub async fn is_cart_badge_equal_to_item(&self) -> SauceResult<bool> {
        let rows = self.count_items().await?;
        let badge = self.cart_count().await;
        Ok(usize::try_from(badge).is_ok_and(|badge| badge == rows))
    }

    /// Press "Checkout" and require the browser to leave the cart
    ///
    /// # Errors
    ///
    /// Fails if the button is missing or the URL does not change
    pub async fn go_to_checkout(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_CHECKOUT)).await?;
        ensure(self.wait_until_left().await, "Should leave the cart page")
    }

    /// Press "Continue Shopping" and require the browser to leave the cart
    ///
    /// # Errors
    ///
    /// Fails if the button is missing or the URL does not change
    pub async fn go_to_continue_shopping(&self) -> SauceResult<()> {
        self.session
            .click(&Locator::css(BUTTON_CONTINUE_SHOPPING))
            .await?;
        ensure(self.wait_until_left().await, "Should leave the cart page")
    }
}

impl<'s, D: PageDriver> NavigablePage for CartPage<'s, D> {
    type Driver = D;
    const PATH: &'static str = "/cart.html";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> Locator {
        Locator::css(TITLE).text_within(TITLE_TEXT)
    }

    fn page_name(&self) -> &'static str {
        "cart"
    }
}
