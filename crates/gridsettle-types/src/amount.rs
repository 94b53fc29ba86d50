//! Checked `Decimal` arithmetic.
//!
//! Commitment amounts and stakes are caller-supplied and unbounded, so
//! every running total goes through these helpers instead of `+`.

use rust_decimal::Decimal;

use crate::{GridsettleError, Result};

/// `a + b`, or `Overflow` naming `what` is being accumulated.
///
/// # Errors
/// Returns [`GridsettleError::Overflow`] if the sum leaves the `Decimal` range.
pub fn checked_add(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| GridsettleError::Overflow(format!("{what}: {a} + {b}")))
}

/// Sum of `values`, failing on the first overflowing step.
///
/// # Errors
/// Returns [`GridsettleError::Overflow`] if the sum leaves the `Decimal` range.
pub fn checked_sum<I>(values: I, what: &str) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, v, what))
}
