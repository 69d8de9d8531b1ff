//! Assertions for scenario validation.
//!
//! Two channels exist. Hard checks ([`ensure`], [`ensure_eq`]) return an
//! error immediately and abort the remaining steps. Soft checks are recorded
//! on a [`SoftAssertions`] collector and reported together at scenario end.

mod soft;

pub use soft::{AssertionFailure, AssertionSummary, SoftAssertionError, SoftAssertions};

use crate::result::{SauceError, SauceResult};
use std::fmt::Debug;

/// Hard check: fail the scenario unless `condition` holds
///
/// # Errors
///
/// Returns [`SauceError::AssertionFailed`] carrying `message`
pub fn ensure(condition: bool, message: impl Into<String>) -> SauceResult<()> {
    if condition {
        Ok(())
    } else {
        Err(SauceError::assertion(message))
    }
}

/// Hard check: fail the scenario unless `actual == expected`
///
/// # Errors
///
/// Returns [`SauceError::AssertionFailed`] describing both values
pub fn ensure_eq<T: PartialEq + Debug>(actual: &T, expected: &T, message: &str) -> SauceResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(SauceError::assertion(format!(
            "{message}: expected {expected:?}, got {actual:?}"
        )))
    }
}
