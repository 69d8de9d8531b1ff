//! Checkout step one (`/checkout-step-one.html`): customer details form.

use super::ERROR_MESSAGE;
use crate::assertion::ensure;
use crate::config::CustomerInfo;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::locator::Locator;
use crate::page_object::NavigablePage;
use crate::result::SauceResult;
use serde::{Deserialize, Serialize};

const INPUT_FIRST_NAME: &str = "#first-name";
const INPUT_LAST_NAME: &str = "#last-name";
const INPUT_POST_CODE: &str = "#postal-code";
const BUTTON_CANCEL: &str = "#cancel";
const BUTTON_CONTINUE: &str = "#continue";
const TITLE: &str = ".title";
const TITLE_TEXT: &str = "Checkout: Your Information";

/// How much of the form is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormState {
    /// No field has a value
    Empty,
    /// Some but not all fields have a value
    PartiallyFilled,
    /// Every required field has a value
    FullyFilled,
}

/// What submitting the form leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// The error banner shows and the URL stays put
    ErrorShown,
    /// The browser moves on to the overview
    Advanced,
}

impl FormState {
    /// Classify the three field values; whitespace-only counts as filled
    #[must_use]
    pub fn of(first_name: &str, last_name: &str, post_code: &str) -> Self {
        let filled = [first_name, last_name, post_code]
            .iter()
            .filter(|value| !value.is_empty())
            .count();
        match filled {
            0 => Self::Empty,
            3 => Self::FullyFilled,
            _ => Self::PartiallyFilled,
        }
    }

    /// Classify a customer record
    #[must_use]
    pub fn of_customer(customer: &CustomerInfo) -> Self {
        Self::of(&customer.first_name, &customer.last_name, &customer.post_code)
    }

    /// Only a fully filled form advances
    #[must_use]
    pub const fn expected_outcome(self) -> SubmitOutcome {
        match self {
            Self::FullyFilled => SubmitOutcome::Advanced,
            Self::Empty | Self::PartiallyFilled => SubmitOutcome::ErrorShown,
        }
    }
}

/// Customer details form
#[derive(Debug)]
pub struct CheckoutInformationPage<'s, D> {
    session: &'s Session<D>,
}

impl<'s, D: PageDriver> CheckoutInformationPage<'s, D> {
    /// Bind to a session
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    async fn fill_checked(&self, selector: &str, value: &str, field: &str) -> SauceResult<()> {
        let input = Locator::css(selector);
        self.session.fill(&input, value).await?;
        let shown = self.session.input_value(&input).await?;
        self.session
            .soft_eq(&shown.as_str(), &value, &format!("{field} field should echo its value"));
        Ok(())
    }

    /// Fill the first name; a wrong echo is a soft failure
    ///
    /// # Errors
    ///
    /// Fails if the field never appears
    pub async fn fill_first_name(&self, value: &str) -> SauceResult<()> {
        self.fill_checked(INPUT_FIRST_NAME, value, "First name").await
    }

    /// Fill the last name; a wrong echo is a soft failure
    ///
    /// # Errors
    ///
    /// Fails if the field never appears
    pub async fn fill_last_name(&self, value: &str) -> SauceResult<()> {
        self.fill_checked(INPUT_LAST_NAME, value, "Last name").await
    }

    /// Fill the postal code; a wrong echo is a soft failure
    ///
    /// # Errors
    ///
    /// Fails if the field never appears
    pub async fn fill_post_code(&self, value: &str) -> SauceResult<()> {
        self.fill_checked(INPUT_POST_CODE, value, "Postal code").await
    }

    /// Fill all three fields
    ///
    /// # Errors
    ///
    /// Fails if a field never appears
    pub async fn fill_information(&self, customer: &CustomerInfo) -> SauceResult<()> {
        self.fill_first_name(&customer.first_name).await?;
        self.fill_last_name(&customer.last_name).await?;
        self.fill_post_code(&customer.post_code).await
    }

    /// Press "Continue" without checking where it leads
    ///
    /// # Errors
    ///
    /// Fails if the button never appears
    pub async fn go_to_continue(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_CONTINUE)).await
    }

    /// Press "Continue" and expect to reach the overview. A shown error or
    /// an unchanged URL is a soft failure; returns whether the form advanced.
    ///
    /// # Errors
    ///
    /// Fails if the button never appears
    pub async fn go_to_checkout_overview_page(&self) -> SauceResult<bool> {
        self.go_to_continue().await?;
        if self.is_found_error_message().await {
            let message = self.error_message().await;
            self.session
                .soft_fail(format!("Checkout form should be accepted, got {message:?}"));
            return Ok(false);
        }
        let left = self.wait_until_left().await;
        self.session
            .soft_true(left, "Should leave the checkout information page");
        Ok(left)
    }

    /// Press "Cancel" and require the browser to leave the form
    ///
    /// # Errors
    ///
    /// Fails if the button is missing or the URL does not change
    pub async fn go_to_cancel(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_CANCEL)).await?;
        ensure(
            self.wait_until_left().await,
            "Should leave the checkout information page",
        )
    }

    /// Whether an error banner shows up within the probe bound
    pub async fn is_found_error_message(&self) -> bool {
        self.session.probe_visible(&Locator::css(ERROR_MESSAGE)).await
    }

    /// Error banner text, empty when none shows up within the probe bound
    pub async fn error_message(&self) -> String {
        self.session
            .probe_text(&Locator::css(ERROR_MESSAGE))
            .await
            .unwrap_or_default()
    }

    /// Fill `customer`, submit, and report what happened
    ///
    /// # Errors
    ///
    /// Fails if a field or the button never appears
    pub async fn submit(&self, customer: &CustomerInfo) -> SauceResult<SubmitOutcome> {
        self.fill_information(customer).await?;
        self.go_to_continue().await?;
        if self.is_found_error_message().await {
            return Ok(SubmitOutcome::ErrorShown);
        }
        if self.wait_until_left().await {
            Ok(SubmitOutcome::Advanced)
        } else {
            Ok(SubmitOutcome::ErrorShown)
        }
    }
}

impl<'s, D: PageDriver> NavigablePage for CheckoutInformationPage<'s, D> {
    type Driver = D;
    const PATH: &'static str = "/checkout-step-one.html";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> Locator {
        Locator::css(TITLE).text_within(TITLE_TEXT)
    }

    fn page_name(&self) -> &'static str {
        "checkout-information"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_state_classification() {
        assert_eq!(FormState::of("", "", ""), FormState::Empty);
        assert_eq!(FormState::of("John", "", ""), FormState::PartiallyFilled);
        assert_eq!(FormState::of("", "Doe", "10110"), FormState::PartiallyFilled);
        assert_eq!(FormState::of("John", "Doe", "10110"), FormState::FullyFilled);
    }

    #[test]
    fn test_only_full_form_advances() {
        assert_eq!(FormState::Empty.expected_outcome(), SubmitOutcome::ErrorShown);
        assert_eq!(
            FormState::PartiallyFilled.expected_outcome(),
            SubmitOutcome::ErrorShown
        );
        assert_eq!(
            FormState::FullyFilled.expected_outcome(),
            SubmitOutcome::Advanced
        );
    }

    #[test]
    fn test_blank_combinations_all_error() {
        let blanks = [
            ("", "", ""),
            ("", "Doe", "10110"),
            ("John", "", "10110"),
            ("John", "Doe", ""),
            ("John", "", ""),
        ];
        for (first, last, post) in blanks {
            assert_eq!(
                FormState::of(first, last, post).expected_outcome(),
                SubmitOutcome::ErrorShown,
                "{first:?} {last:?} {post:?}"
            );
        }
    }

    #[test]
    fn test_default_customer_is_complete() {
        assert_eq!(
            FormState::of_customer(&CustomerInfo::default()),
            FormState::FullyFilled
        );
    }
}
