//! Checkout step two (`/checkout-step-two.html`): order summary and totals.

use super::CartListing;
use crate::assertion::ensure;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::item::Item;
use crate::locator::Locator;
use crate::money::{grand_total, parse_amount, sum_prices, tax_for};
use crate::page_object::NavigablePage;
use crate::result::SauceResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const BUTTON_CANCEL: &str = "#cancel";
const BUTTON_FINISH: &str = "#finish";
const SUBTOTAL_LABEL: &str = "div.summary_subtotal_label";
const TAX_LABEL: &str = "div.summary_tax_label";
const TOTAL_LABEL: &str = "div.summary_total_label";
const TITLE: &str = ".title";
const TITLE_TEXT: &str = "Checkout: Overview";

/// Outcome of the three independent price checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCheck {
    /// Shown subtotal equals the sum of expected prices
    pub subtotal: bool,
    /// Shown tax equals the rounded tax on that sum
    pub tax: bool,
    /// Shown total equals sum plus rounded tax
    pub grand_total: bool,
}

impl PriceCheck {
    /// Compare shown amounts with what `expected_subtotal` implies at `rate`.
    /// An unreadable amount fails its check.
    #[must_use]
    pub fn evaluate(
        expected_subtotal: Decimal,
        rate: Decimal,
        shown_subtotal: Option<Decimal>,
        shown_tax: Option<Decimal>,
        shown_total: Option<Decimal>,
    ) -> Self {
        Self {
            subtotal: shown_subtotal == Some(expected_subtotal),
            tax: shown_tax == Some(tax_for(expected_subtotal, rate)),
            grand_total: shown_total == Some(grand_total(expected_subtotal, rate)),
        }
    }

    /// Whether every check passed
    #[must_use]
    pub const fn all(&self) -> bool {
        self.subtotal && self.tax && self.grand_total
    }
}

/// Order summary
#[derive(Debug)]
pub struct CheckoutOverviewPage<'s, D> {
    session: &'s Session<D>,
    listing: CartListing<'s, D>,
}

impl<'s, D: PageDriver> CheckoutOverviewPage<'s, D> {
    /// Bind to a session
    pub const fn new(session: &'s Session<D>) -> Self {
        Self {
            session,
            listing: CartListing::new(session),
        }
    }

    /// Number of summary rows
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

    /// Check every expected item is listed. Each miss is a soft failure and
    /// the scan goes on; returns whether all were found.
    ///
    /// # Errors
    ///
    /// Fails if a row cannot be read
    pub async fn is_corrected_cart_item(&self, expected: &[Item]) -> SauceResult<bool> {
        let mut corrected = true;
        for item in expected {
            if self.listing.find(item).await?.is_none() {
                self.session
                    .soft_fail(format!("Item {item} should be listed in the overview"));
                corrected = false;
            }
        }
        Ok(corrected)
    }

    async fn amount(&self, selector: &str) -> SauceResult<Option<Decimal>> {
        let label = self.session.text(&Locator::css(selector)).await?;
        Ok(parse_amount(&label))
    }

    /// Amount on the "Item total" label
    pub async fn subtotal(&self) -> SauceResult<Option<Decimal>> {
        self.amount(SUBTOTAL_LABEL).await
    }

    /// Amount on the "Tax" label
    pub async fn tax(&self) -> SauceResult<Option<Decimal>> {
        self.amount(TAX_LABEL).await
    }

    /// Amount on the "Total" label
    pub async fn grand_total(&self) -> SauceResult<Option<Decimal>> {
        self.amount(TOTAL_LABEL).await
    }

    fn tax_rate(&self) -> Decimal {
        self.session.config().tax_rate
    }

    /// Shown subtotal equals `total`
    pub async fn is_corrected_total_price(&self, total: Decimal) -> SauceResult<bool> {
        Ok(self.subtotal().await? == Some(total))
    }

    /// Shown tax equals `round(total * rate, 2)`
    pub async fn is_corrected_tax(&self, total: Decimal) -> SauceResult<bool> {
        Ok(self.tax().await? == Some(tax_for(total, self.tax_rate())))
    }

    /// Shown total equals `total + round(total * rate, 2)`
    pub async fn is_corrected_grand_total_price(&self, total: Decimal) -> SauceResult<bool> {
        Ok(self.grand_total().await? == Some(grand_total(total, self.tax_rate())))
    }

    /// Run all three price checks against the expected selection
    pub async fn check_prices(&self, expected: &[Item]) -> SauceResult<PriceCheck> {
        let check = PriceCheck::evaluate(
            sum_prices(expected),
            self.tax_rate(),
            self.subtotal().await?,
            self.tax().await?,
            self.grand_total().await?,
        );
        tracing::debug!(?check, "price check");
        Ok(check)
    }

    /// Press "Cancel" and require the browser to leave the overview
    ///
    /// # Errors
    ///
    /// Fails if the button is missing or the URL does not change
    pub async fn go_to_cancel(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_CANCEL)).await?;
        ensure(self.wait_until_left().await, "Should leave the overview page")
    }

    /// Press "Finish" and require the browser to leave the overview
    ///
    /// # Errors
    ///
    /// Fails if the button is missing or the URL does not change
    pub async fn go_to_checkout_complete_page(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_FINISH)).await?;
        ensure(self.wait_until_left().await, "Should leave the overview page")
    }
}

impl<'s, D: PageDriver> NavigablePage for CheckoutOverviewPage<'s, D> {
    type Driver = D;
    const PATH: &'static str = "/checkout-step-two.html";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> Locator {
        Locator::css(TITLE).text_within(TITLE_TEXT)
    }

    fn page_name(&self) -> &'static str {
        "checkout-overview"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_check_passes_on_storefront_amounts() {
        let check = PriceCheck::evaluate(
            dec!(29.98),
            dec!(0.08),
            Some(dec!(29.98)),
            Some(dec!(2.40)),
            Some(dec!(32.38)),
        );
        assert!(check.all());
    }

    #[test]
    fn test_price_checks_are_independent() {
        let check = PriceCheck::evaluate(
            dec!(39.98),
            dec!(0.08),
            Some(dec!(39.98)),
            Some(dec!(3.19)),
            Some(dec!(43.18)),
        );
        assert!(check.subtotal);
        assert!(!check.tax);
        assert!(check.grand_total);
        assert!(!check.all());
    }

    #[test]
    fn test_unreadable_amount_fails_its_check() {
        let check = PriceCheck::evaluate(dec!(7.99), dec!(0.08), None, Some(dec!(0.64)), None);
        assert!(!check.subtotal);
        assert!(check.tax);
        assert!(!check.grand_total);
    }
}
