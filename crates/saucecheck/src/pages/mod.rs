//! Page models for the storefront.
//!
//! Each model borrows the scenario [`Session`] and owns nothing else; the
//! page identity (path, ready marker, locators) is constant.

mod cart;
mod checkout_complete;
mod checkout_information;
mod checkout_overview;
mod inventory;
mod login;

pub use cart::CartPage;
pub use checkout_complete::{CheckoutCompletePage, COMPLETE_HEADER, COMPLETE_TEXT, COMPLETE_TITLE};
pub use checkout_information::{CheckoutInformationPage, FormState, SubmitOutcome};
pub use checkout_overview::{CheckoutOverviewPage, PriceCheck};
pub use inventory::{locale_compare, names_sorted, prices_sorted, InventoryPage, SortMode};
pub use login::LoginPage;

use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::item::Item;
use crate::locator::Locator;
use crate::money::parse_price;
use crate::result::SauceResult;
use rust_decimal::Decimal;

pub(crate) const CART_ITEM: &str = "div.cart_item";
pub(crate) const ITEM_NAME: &str = "div.inventory_item_name";
pub(crate) const ITEM_PRICE: &str = "div.inventory_item_price";
pub(crate) const ERROR_MESSAGE: &str = ".error-message-container h3";

/// Read access to the `div.cart_item` rows shown on the cart and overview
/// pages
#[derive(Debug)]
pub(crate) struct CartListing<'s, D> {
    session: &'s Session<D>,
}

impl<'s, D: PageDriver> CartListing<'s, D> {
    pub(crate) const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    pub(crate) fn entry(index: usize) -> Locator {
        Locator::css(CART_ITEM).nth(index)
    }

    pub(crate) async fn count(&self) -> SauceResult<usize> {
        self.session.count(&Locator::css(CART_ITEM)).await
    }

    pub(crate) async fn name(&self, index: usize) -> SauceResult<String> {
        self.session
            .text(&Self::entry(index).css_within(ITEM_NAME))
            .await
    }

    /// `None` when the price text is not a number
    pub(crate) async fn price(&self, index: usize) -> SauceResult<Option<Decimal>> {
        let text = self
            .session
            .text(&Self::entry(index).css_within(ITEM_PRICE))
            .await?;
        Ok(parse_price(&text))
    }

    /// Index of the first entry matching `expected` by name and price
    pub(crate) async fn find(&self, expected: &Item) -> SauceResult<Option<usize>> {
        let count = self.count().await?;
        for index in 0..count {
            let name = self.name(index).await?;
            let price = self.price(index).await?;
            if price.is_some_and(|price| expected.matches(&name, price)) {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Every displayed entry; unreadable prices read as zero
    pub(crate) async fn items(&self) -> SauceResult<Vec<Item>> {
        let count = self.count().await?;
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let name = self.name(index).await?;
            let price = self.price(index).await?.unwrap_or(Decimal::ZERO);
            items.push(Item::new(name, price));
        }
        Ok(items)
    }
}
