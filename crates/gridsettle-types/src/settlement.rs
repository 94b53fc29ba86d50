//! Settlement round output.
//!
//! A settlement round pairs buffered production against buffered
//! consumption and reports what moved at the single price read for the
//! round.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CommitmentRef, Result, amount};

/// One production/consumption pairing within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub production: CommitmentRef,
    pub consumption: CommitmentRef,
    /// Energy moved: `min(remaining production, remaining consumption)`.
    pub quantity: Decimal,
    /// `quantity * price`.
    pub value: Decimal,
}

/// Result of one `settle_commitment` round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    /// 1-based round counter.
    pub round: u64,
    /// Uniform price applied to every fill in the round.
    pub price: Decimal,
    pub price_timestamp: DateTime<Utc>,
    /// Fills in matching order.
    pub fills: Vec<Fill>,
    /// Commitments fully matched and settled this round, in completion order.
    pub settled: Vec<CommitmentRef>,
    /// Commitments still buffered after the round, with what remains unmatched.
    pub carried: Vec<(CommitmentRef, Decimal)>,
    /// SHA-256 over the ordered fills.
    pub settlement_root: [u8; 32],
    pub settled_at: DateTime<Utc>,
}

impl SettlementReport {
    /// Total energy matched in the round.
    ///
    /// # Errors
    /// Returns `Overflow` if the sum leaves the `Decimal` range.
    pub fn matched_energy(&self) -> Result<Decimal> {
        amount::checked_sum(self.fills.iter().map(|f| f.quantity), "matched energy")
    }

    /// Total value moved in the round.
    ///
    /// # Errors
    /// Returns `Overflow` if the sum leaves the `Decimal` range.
    pub fn total_value(&self) -> Result<Decimal> {
        amount::checked_sum(self.fills.iter().map(|f| f.value), "round value")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.settled.is_empty()
    }
}
