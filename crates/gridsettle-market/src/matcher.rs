//! Greedy FIFO matcher.
//!
//! Pure function of the buffered entries: no clock, no oracle, no state.
//! Production and consumption are paired head against head in admission
//! order, each fill moving `min(production, consumption)`.
//!
//! ```text
//!   production:  P1(5) P2(3)          consumption:  C1(4) C2(6)
//!   fill P1×C1 4   → C1 done, P1 has 1 left
//!   fill P1×C2 1   → P1 done, C2 has 5 left
//!   fill P2×C2 3   → P2 done, C2 has 2 left (carried)
//! ```
//!
//! Zero-quantity entries have nothing to match and complete immediately.

use gridsettle_types::{CommitmentRef, Result, amount};
use rust_decimal::Decimal;

use crate::pending_buffer::BufferEntry;

/// Quantity moved between one production and one consumption commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedFill {
    pub production: CommitmentRef,
    pub consumption: CommitmentRef,
    pub quantity: Decimal,
}

/// Outcome of one matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPlan {
    /// Fills in execution order.
    pub fills: Vec<PlannedFill>,
    /// Commitments fully covered by this pass, in completion order.
    pub completed: Vec<CommitmentRef>,
    /// Commitments left with unmatched quantity, in admission order.
    pub carried: Vec<(CommitmentRef, Decimal)>,
}

impl MatchPlan {
    /// Total quantity moved.
    ///
    /// # Errors
    /// Returns `Overflow` if the sum leaves the `Decimal` range.
    pub fn matched_energy(&self) -> Result<Decimal> {
        amount::checked_sum(self.fills.iter().map(|f| f.quantity), "matched energy")
    }
}

/// Plan fills over `entries`, which must be in admission order.
pub fn plan_matches<'a, I>(entries: I) -> MatchPlan
where
    I: IntoIterator<Item = &'a BufferEntry>,
{
    let entries: Vec<&BufferEntry> = entries.into_iter().collect();
    let mut remaining: Vec<Decimal> = entries.iter().map(|e| e.remaining).collect();
    let mut plan = MatchPlan::default();

    let (production, consumption): (Vec<usize>, Vec<usize>) =
        (0..entries.len()).partition(|&i| entries[i].is_production);

    for (i, entry) in entries.iter().enumerate() {
        if remaining[i].is_zero() {
            plan.completed.push(entry.commitment);
        }
    }

    let mut pi = 0;
    let mut ci = 0;
    loop {
        while pi < production.len() && remaining[production[pi]].is_zero() {
            pi += 1;
        }
        while ci < consumption.len() && remaining[consumption[ci]].is_zero() {
            ci += 1;
        }
        let (Some(&p), Some(&c)) = (production.get(pi), consumption.get(ci)) else {
            break;
        };

        let quantity = remaining[p].min(remaining[c]);
        remaining[p] -= quantity;
        remaining[c] -= quantity;
        plan.fills.push(PlannedFill {
            production: entries[p].commitment,
            consumption: entries[c].commitment,
            quantity,
        });

        if remaining[p].is_zero() {
            plan.completed.push(entries[p].commitment);
        }
        if remaining[c].is_zero() {
            plan.completed.push(entries[c].commitment);
        }
    }

    plan.carried = entries
        .iter()
        .zip(&remaining)
        .filter(|(_, left)| !left.is_zero())
        .map(|(e, left)| (e.commitment, *left))
        .collect();
    plan
}
