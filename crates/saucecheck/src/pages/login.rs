//! Login page (`/`).

use super::ERROR_MESSAGE;
use crate::assertion::{ensure, ensure_eq};
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::locator::Locator;
use crate::page_object::NavigablePage;
use crate::result::SauceResult;

const INPUT_USERNAME: &str = "#user-name";
const INPUT_PASSWORD: &str = "#password";
const BUTTON_LOGIN: &str = "#login-button";
const LOGO: &str = ".login_logo";
const TITLE_TEXT: &str = "Swag Labs";

/// Credential form
#[derive(Debug)]
pub struct LoginPage<'s, D> {
    session: &'s Session<D>,
}

impl<'s, D: PageDriver> LoginPage<'s, D> {
    /// Bind to a session
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    /// Fill the username field and check it echoes the value
    ///
    /// # Errors
    ///
    /// Fails if the field never appears or shows a different value
    pub async fn fill_username(&self, username: &str) -> SauceResult<()> {
        let field = Locator::css(INPUT_USERNAME);
        self.session.fill(&field, username).await?;
        let shown = self.session.input_value(&field).await?;
        ensure_eq(&shown.as_str(), &username, "username field")
    }

    /// Fill the password field and check it echoes the value
    ///
    /// # Errors
    ///
    /// Fails if the field never appears or shows a different value
    pub async fn fill_password(&self, password: &str) -> SauceResult<()> {
        let field = Locator::css(INPUT_PASSWORD);
        self.session.fill(&field, password).await?;
        let shown = self.session.input_value(&field).await?;
        ensure_eq(&shown.as_str(), &password, "password field")
    }

    /// Press the login button
    ///
    /// # Errors
    ///
    /// Fails if the button never appears
    pub async fn click_login(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(BUTTON_LOGIN)).await
    }

    /// Fill both fields, submit, and require that no error appears
    ///
    /// # Errors
    ///
    /// Fails if the form is missing or the site shows an error banner
    pub async fn login(&self, username: &str, password: &str) -> SauceResult<()> {
        tracing::info!(username, "log in");
        self.session
            .fill(&Locator::css(INPUT_USERNAME), username)
            .await?;
        self.session
            .fill(&Locator::css(INPUT_PASSWORD), password)
            .await?;
        self.click_login().await?;
        ensure(!self.is_found_error_message().await, "Found error message")
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
}

impl<'s, D: PageDriver> NavigablePage for LoginPage<'s, D> {
    type Driver = D;
    const PATH: &'static str = "/";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> Locator {
        Locator::css(LOGO).text_within(TITLE_TEXT)
    }

    fn page_name(&self) -> &'static str {
        "login"
    }
}
