//! Suite configuration and test data.
//!
//! Both load from YAML; every field has a default so a partial file only
//! overrides what it names.

use crate::money::DEFAULT_TAX_RATE;
use crate::result::{SauceError, SauceResult};
use crate::wait::{WaitOptions, CRITICAL_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, PROBE_TIMEOUT_MS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storefront under test
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// REST API under test
pub const DEFAULT_API_BASE_URL: &str = "https://reqres.in";

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "secret_sauce";

/// Wait bounds in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Navigation, readiness and actions
    pub critical_ms: u64,
    /// Optional reads
    pub probe_ms: u64,
    /// Delay between attempts
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            critical_ms: CRITICAL_TIMEOUT_MS,
            probe_ms: PROBE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timeouts {
    /// Single attempt per wait, for storefronts that settle synchronously
    /// such as [`crate::mock::StoreSimulator`]
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            critical_ms: 0,
            probe_ms: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Options for critical waits
    #[must_use]
    pub const fn critical(&self) -> WaitOptions {
        WaitOptions::critical()
            .with_timeout(self.critical_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Options for probes
    #[must_use]
    pub const fn probe(&self) -> WaitOptions {
        WaitOptions::probe()
            .with_timeout(self.probe_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}

/// Where the suites point and how long they wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Storefront origin, without trailing slash
    pub base_url: String,
    /// REST API origin
    pub api_base_url: String,
    /// Value for the `x-api-key` header, if the API wants one
    pub api_key: Option<String>,
    /// Sales tax rate applied at checkout
    pub tax_rate: Decimal,
    /// Wait bounds
    pub timeouts: Timeouts,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            tax_rate: DEFAULT_TAX_RATE,
            timeouts: Timeouts::default(),
        }
    }
}

impl SuiteConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set storefront origin
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set API origin
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set tax rate
    #[must_use]
    pub const fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Set wait bounds
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Absolute storefront URL for a path such as `/cart.html`
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Parse from YAML text
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or a base URL that is not http(s)
    pub fn from_yaml(text: &str) -> SauceResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SauceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Check URLs and bounds
    ///
    /// # Errors
    ///
    /// Returns [`SauceError::ConfigError`] naming the offending field
    pub fn validate(&self) -> SauceResult<()> {
        for (field, value) in [("base_url", &self.base_url), ("api_base_url", &self.api_base_url)] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(SauceError::ConfigError {
                    message: format!("{field} must be an http(s) URL, got {value:?}"),
                });
            }
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(SauceError::ConfigError {
                message: "timeouts.poll_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Checkout form values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Postal code
    pub post_code: String,
}

impl Default for CustomerInfo {
    fn default() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            post_code: "10110".to_string(),
        }
    }
}

/// Accounts, customer details and search terms fed to the UI suites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestData {
    /// Accounts expected to log in
    pub valid_users: Vec<Credentials>,
    /// Accounts expected to be refused
    pub locked_users: Vec<Credentials>,
    /// Account used to set up page-level cases
    pub suite_user: Credentials,
    /// Account used by the purchase scenario
    pub buyer: Credentials,
    /// Checkout form values
    pub customer: CustomerInfo,
    /// Name fragments searched for in the purchase scenario
    pub search_items: Vec<String>,
    /// Items added when a case needs a non-empty cart
    pub preselect_count: usize,
}

impl Default for TestData {
    fn default() -> Self {
        let valid_users = [
            "standard_user",
            "problem_user",
            "performance_glitch_user",
            "error_user",
            "visual_user",
        ]
        .into_iter()
        .map(|name| Credentials::new(name, DEMO_PASSWORD))
        .collect();
        Self {
            valid_users,
            locked_users: vec![Credentials::new("locked_out_user", DEMO_PASSWORD)],
            suite_user: Credentials::new("standard_user", DEMO_PASSWORD),
            buyer: Credentials::new("standard_user", DEMO_PASSWORD),
            customer: CustomerInfo::default(),
            search_items: vec!["backpack".to_string(), "onesie".to_string()],
            preselect_count: 2,
        }
    }
}

impl TestData {
    /// Parse from YAML text
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML
    pub fn from_yaml(text: &str) -> SauceResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Load from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SauceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    mod suite_config {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, "https://www.saucedemo.com");
            assert_eq!(config.api_base_url, "https://reqres.in");
            assert_eq!(config.tax_rate, dec!(0.08));
            assert_eq!(config.timeouts.critical().timeout_ms, 5_000);
            assert_eq!(config.timeouts.probe().timeout_ms, 1_000);
        }

        #[test]
        fn test_immediate_timeouts_still_validate() {
            let config = SuiteConfig::new().with_timeouts(Timeouts::immediate());
            assert!(config.validate().is_ok());
            assert_eq!(config.timeouts.critical().timeout_ms, 0);
            assert_eq!(config.timeouts.probe().timeout_ms, 0);
        }

        #[test]
        fn test_url_joins_without_double_slash() {
            let config = SuiteConfig::new().with_base_url("http://127.0.0.1:8080/");
            assert_eq!(config.url("/cart.html"), "http://127.0.0.1:8080/cart.html");
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let yaml = "base_url: http://localhost:3000\ntimeouts:\n  probe_ms: 200\n";
            let config = SuiteConfig::from_yaml(yaml).unwrap();
            assert_eq!(config.base_url, "http://localhost:3000");
            assert_eq!(config.timeouts.probe_ms, 200);
            assert_eq!(config.timeouts.critical_ms, 5_000);
            assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        }

        #[test]
        fn test_tax_rate_from_yaml() {
            let config = SuiteConfig::from_yaml("tax_rate: 0.1\n").unwrap();
            assert_eq!(config.tax_rate, dec!(0.1));
        }

        #[test]
        fn test_rejects_non_http_url() {
            let err = SuiteConfig::from_yaml("base_url: ftp://example.com\n").unwrap_err();
            assert!(err.to_string().contains("base_url"));
        }

        #[test]
        fn test_from_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("suite.yaml");
            std::fs::write(&path, "api_key: reqres-free-v1\n").unwrap();
            let config = SuiteConfig::from_yaml_file(&path).unwrap();
            assert_eq!(config.api_key.as_deref(), Some("reqres-free-v1"));
        }
    }

    mod test_data {
        use super::*;

        #[test]
        fn test_default_accounts() {
            let data = TestData::default();
            assert_eq!(data.valid_users.len(), 5);
            assert!(data
                .valid_users
                .iter()
                .all(|user| user.password == DEMO_PASSWORD));
            assert_eq!(data.locked_users[0].username, "locked_out_user");
        }

        #[test]
        fn test_customer_uses_camel_case_keys() {
            let yaml = "customer:\n  firstName: Ada\n  lastName: Lovelace\n  postCode: '90210'\n";
            let data = TestData::from_yaml(yaml).unwrap();
            assert_eq!(data.customer.first_name, "Ada");
            assert_eq!(data.customer.post_code, "90210");
            assert_eq!(data.preselect_count, 2);
        }
    }
}
