//! Soft assertions
//!
//! Record mismatches without stopping the scenario. Multi-item verification
//! (cart reconciliation, overview pricing) uses this so one bad item does not
//! hide failures in the rest.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A single recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Index of this failure in the sequence
    pub index: usize,
}

impl AssertionFailure {
    /// Create a new assertion failure
    #[must_use]
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

/// Soft assertions collector
///
/// ```ignore
/// let mut soft = SoftAssertions::new();
/// soft.assert_eq(&1, &2, "badge count");
/// soft.assert_true(false, "item image shown");
/// assert_eq!(soft.failure_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<AssertionFailure>,
    assertion_count: usize,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert two values are equal
    pub fn assert_eq<T: PartialEq + Debug>(&mut self, actual: &T, expected: &T, message: &str) {
        self.assertion_count += 1;
        if actual != expected {
            self.record_failure(format!("{message}: expected {expected:?}, got {actual:?}"));
        }
    }

    /// Assert a condition is true
    pub fn assert_true(&mut self, condition: bool, message: &str) {
        self.assertion_count += 1;
        if !condition {
            self.record_failure(format!("{message}: expected true, got false"));
        }
    }

    /// Assert a condition is false
    pub fn assert_false(&mut self, condition: bool, message: &str) {
        self.assertion_count += 1;
        if condition {
            self.record_failure(format!("{message}: expected false, got true"));
        }
    }

    /// Record a custom failure
    pub fn fail(&mut self, message: impl Into<String>) {
        self.assertion_count += 1;
        self.record_failure(message.into());
    }

    fn record_failure(&mut self, message: String) {
        tracing::warn!(%message, "soft assertion failed");
        let failure = AssertionFailure::new(message, self.failures.len());
        self.failures.push(failure);
    }

    /// Get all failures
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get the total number of assertions checked
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Verify all assertions passed, returning error if any failed
    ///
    /// # Errors
    ///
    /// Returns error containing all failure messages if any assertions failed
    pub fn verify(&self) -> Result<(), SoftAssertionError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(SoftAssertionError::new(&self.failures))
        }
    }

    /// Verify, then start over with an empty collector
    ///
    /// # Errors
    ///
    /// Returns error containing all failure messages if any assertions failed
    pub fn drain(&mut self) -> Result<(), SoftAssertionError> {
        let verdict = self.verify();
        self.failures.clear();
        self.assertion_count = 0;
        verdict
    }

    /// Get a summary of the assertions
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count - self.failures.len(),
            failed: self.failures.len(),
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}

/// Error type for soft assertion failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftAssertionError {
    /// All failure messages
    pub failures: Vec<String>,
    /// Number of failed assertions
    pub count: usize,
}

impl SoftAssertionError {
    /// Create a new error from failures
    #[must_use]
    pub fn new(failures: &[AssertionFailure]) -> Self {
        Self {
            failures: failures.iter().map(|f| f.message.clone()).collect(),
            count: failures.len(),
        }
    }
}

impl std::fmt::Display for SoftAssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} soft assertion(s) failed:", self.count)?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {failure}", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for SoftAssertionError {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod collecting {
        use super::*;

        #[test]
        fn test_new_creates_empty() {
            let soft = SoftAssertions::new();
            assert!(soft.all_passed());
            assert_eq!(soft.failure_count(), 0);
            assert_eq!(soft.assertion_count(), 0);
        }

        #[test]
        fn test_failures_do_not_stop_collection() {
            let mut soft = SoftAssertions::new();
            soft.assert_eq(&1, &2, "badge");
            soft.assert_true(true, "title");
            soft.assert_false(true, "error shown");
            soft.fail("Sauce Labs Onesie not found in cart");

            assert_eq!(soft.assertion_count(), 4);
            assert_eq!(soft.failure_count(), 3);
            assert_eq!(soft.failures()[2].index, 2);
            assert!(soft.failures()[0].message.contains("expected 2, got 1"));
        }

        #[test]
        fn test_summary() {
            let mut soft = SoftAssertions::new();
            soft.assert_true(true, "a");
            soft.assert_true(false, "b");
            let summary = soft.summary();
            assert_eq!(summary.total, 2);
            assert_eq!(summary.passed, 1);
            assert_eq!(summary.failed, 1);
        }
    }

    mod verification {
        use super::*;

        #[test]
        fn test_verify_ok_when_clean() {
            let mut soft = SoftAssertions::new();
            soft.assert_eq(&"a", &"a", "same");
            assert!(soft.verify().is_ok());
        }

        #[test]
        fn test_verify_lists_every_failure() {
            let mut soft = SoftAssertions::new();
            soft.fail("first");
            soft.fail("second");
            let err = soft.verify().unwrap_err();
            assert_eq!(err.count, 2);
            let text = err.to_string();
            assert!(text.contains("1. first"));
            assert!(text.contains("2. second"));
        }

        #[test]
        fn test_drain_resets_after_verdict() {
            let mut soft = SoftAssertions::new();
            soft.fail("badge should change");
            assert_eq!(soft.drain().unwrap_err().count, 1);
            assert!(soft.all_passed());
            assert_eq!(soft.assertion_count(), 0);
            assert!(soft.drain().is_ok());
        }
    }
}
