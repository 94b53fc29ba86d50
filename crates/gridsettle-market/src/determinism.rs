//! Settlement root: a digest over one settlement round.
//!
//! Replaying the same buffer against the same price must yield the same
//! fills, so any two replicas can compare rounds by root instead of by
//! full report.

use gridsettle_types::{CommitmentRef, Fill};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

fn hash_ref(hasher: &mut Sha256, r: CommitmentRef) {
    hasher.update(r.profile_id.0.to_le_bytes());
    hasher.update((r.index as u64).to_le_bytes());
}

fn hash_decimal(hasher: &mut Sha256, value: Decimal) {
    let text = value.normalize().to_string();
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}

/// Compute the settlement root for a round.
///
/// Depends on the round number, the applied price, and every fill (both
/// commitment references, quantity and value) in order. Decimal values are
/// normalized first, so `1.50` and `1.5` hash the same.
#[must_use]
pub fn compute_settlement_root(round: u64, price: Decimal, fills: &[Fill]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"gridsettle:settlement_root:v1:");
    hasher.update(round.to_le_bytes());
    hash_decimal(&mut hasher, price);
    hasher.update((fills.len() as u64).to_le_bytes());

    for fill in fills {
        hash_ref(&mut hasher, fill.production);
        hash_ref(&mut hasher, fill.consumption);
        hash_decimal(&mut hasher, fill.quantity);
        hash_decimal(&mut hasher, fill.value);
    }

    hasher.finalize().into()
}

/// Recompute and compare.
#[must_use]
pub fn verify_settlement_root(
    round: u64,
    price: Decimal,
    fills: &[Fill],
    expected_root: &[u8; 32],
) -> bool {
    compute_settlement_root(round, price, fills) == *expected_root
}

/// Lowercase hex rendering for logs and reports.
#[must_use]
pub fn root_hex(root: &[u8; 32]) -> String {
    hex::encode(root)
}
