//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more specs failed
    #[error("Suite failed: {message}")]
    Suite {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Saucecheck library error
    #[error("Saucecheck error: {0}")]
    Saucecheck(#[from] saucecheck::SauceError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a suite failure
    #[must_use]
    pub fn suite(message: impl Into<String>) -> Self {
        Self::Suite {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("no sheets token");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("no sheets token"));
    }

    #[test]
    fn test_suite_error() {
        let err = CliError::suite("2 of 38 specs failed");
        assert_eq!(err.to_string(), "Suite failed: 2 of 38 specs failed");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }

    #[test]
    fn test_library_error_from() {
        let err: CliError = saucecheck::SauceError::assertion("x").into();
        assert!(err.to_string().starts_with("Saucecheck error: Assertion failed"));
    }
}
