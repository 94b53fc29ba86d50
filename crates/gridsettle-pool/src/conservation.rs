//! Energy conservation invariant checker.
//!
//! Invariant enforced between the interval ledger and the registry:
//! ```text
//! ∀ bucket: produced(bucket) == Σ amount  of posted production  in bucket
//!           consumed(bucket) == Σ amount  of posted consumption in bucket
//! ```
//! and the same for the ledger-wide running totals. Posting is the only
//! operation that changes interval accumulators; settlement and withdrawal
//! must leave them exactly as they were.

use std::collections::BTreeMap;

use gridsettle_registry::ProfileRegistry;
use gridsettle_types::{BucketIndex, GridsettleError, Result, amount};
use rust_decimal::Decimal;

use crate::ledger::IntervalLedger;

/// Per-bucket `(produced, consumed)` sums.
pub type BucketTotals = BTreeMap<BucketIndex, (Decimal, Decimal)>;

/// Recomputes interval totals from the registry and compares them with
/// what the ledger accumulated.
pub struct EnergyConservation;

impl EnergyConservation {
    /// Expected per-bucket totals, derived from posted commitments.
    ///
    /// # Errors
    /// - `EnergyConservationViolation` if a posted commitment has no bucket
    ///   recorded, or an unposted one has
    /// - `Overflow` if posted amounts sum past the `Decimal` range, which
    ///   the ledger never accepts
    pub fn expected_totals(registry: &ProfileRegistry) -> Result<BucketTotals> {
        let mut totals = BucketTotals::new();
        for (r, c) in registry.iter_commitments() {
            match (c.pool_processed, c.bucket) {
                (true, Some(bucket)) => {
                    let entry = totals.entry(bucket).or_insert((Decimal::ZERO, Decimal::ZERO));
                    if c.is_production {
                        entry.0 =
                            amount::checked_add(entry.0, c.energy_amount, "posted production")?;
                    } else {
                        entry.1 =
                            amount::checked_add(entry.1, c.energy_amount, "posted consumption")?;
                    }
                }
                (false, None) => {}
                (posted, bucket) => {
                    return Err(GridsettleError::EnergyConservationViolation {
                        reason: format!(
                            "{r}: pool_processed={posted} but bucket={bucket:?}"
                        ),
                    });
                }
            }
        }
        Ok(totals)
    }

    /// Verify the ledger against the registry.
    ///
    /// # Errors
    /// Returns [`GridsettleError::EnergyConservationViolation`] on the first
    /// bucket (or total) that does not match, or `Overflow` if the registry
    /// holds more posted energy than a `Decimal` can sum.
    pub fn verify(ledger: &IntervalLedger, registry: &ProfileRegistry) -> Result<()> {
        let expected = Self::expected_totals(registry)?;

        let actual: BucketTotals = ledger
            .intervals()
            .filter(|(_, i)| !i.is_empty())
            .map(|(b, i)| (b, (i.energy_produced, i.energy_consumed)))
            .collect();
        let expected_nonzero: BucketTotals = expected
            .into_iter()
            .filter(|(_, (p, c))| !(p.is_zero() && c.is_zero()))
            .collect();

        for (bucket, (produced, consumed)) in &expected_nonzero {
            let (ledger_produced, ledger_consumed) = actual
                .get(bucket)
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            if ledger_produced != *produced || ledger_consumed != *consumed {
                return Err(GridsettleError::EnergyConservationViolation {
                    reason: format!(
                        "{bucket}: ledger produced/consumed {ledger_produced}/{ledger_consumed} \
                         != posted {produced}/{consumed}"
                    ),
                });
            }
        }
        if let Some(bucket) = actual.keys().find(|b| !expected_nonzero.contains_key(*b)) {
            return Err(GridsettleError::EnergyConservationViolation {
                reason: format!("{bucket} holds energy but no posted commitment maps to it"),
            });
        }

        let produced =
            amount::checked_sum(expected_nonzero.values().map(|t| t.0), "posted production")?;
        let consumed =
            amount::checked_sum(expected_nonzero.values().map(|t| t.1), "posted consumption")?;
        if ledger.total_energy_produced() != produced || ledger.total_energy_consumed() != consumed
        {
            return Err(GridsettleError::EnergyConservationViolation {
                reason: format!(
                    "ledger totals {}/{} != posted totals {produced}/{consumed}",
                    ledger.total_energy_produced(),
                    ledger.total_energy_consumed(),
                ),
            });
        }
        Ok(())
    }
}
