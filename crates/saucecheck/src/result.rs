//! Result and error types for Saucecheck.

use crate::assertion::SoftAssertionError;
use thiserror::Error;

/// Result type for Saucecheck operations
pub type SauceResult<T> = Result<T, SauceError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum SauceError {
    /// A critical wait exceeded its bound
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Locator did not resolve to an element
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Driver-level failure (evaluation, input dispatch)
    #[error("Driver error: {message}")]
    DriverError {
        /// Error message
        message: String,
    },

    /// Hard assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// One or more soft assertions failed during the scenario
    #[error("{0}")]
    SoftAssertions(#[from] SoftAssertionError),

    /// Response body did not match its contract
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Error message
        message: String,
    },

    /// Spreadsheet transport error
    #[error("Sheet error: {message}")]
    SheetError {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Config error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SauceError {
    /// Build a hard assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Build a driver failure
    pub fn driver(message: impl Into<String>) -> Self {
        Self::DriverError {
            message: message.into(),
        }
    }

    /// Whether this error came from a critical wait running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = SauceError::Timeout {
            ms: 5000,
            waited_for: "Products".to_string(),
        };
        assert_eq!(err.to_string(), "Timed out after 5000ms waiting for Products");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_assertion_helper() {
        let err = SauceError::assertion("badge should be 2");
        assert!(matches!(err, SauceError::AssertionFailed { .. }));
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("badge should be 2"));
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SauceError = io.into();
        assert!(matches!(err, SauceError::Io(_)));
    }
}
