//! # Commitment: a time-boxed declaration to produce or consume energy
//!
//! ## Lifecycle flags
//!
//! ```text
//!   created ──deposit──▶ pool_processed ──settle──▶ market_processed + settled
//!      │                      │
//!      └── amendable ─────────┘ (locked from here on)
//! ```
//!
//! All three flags are **monotonic**: they only ever go `false → true`.
//! Commitments are never deleted; the owning profile's sequence is
//! append-only and every transition is a flag flip.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::BucketIndex;

/// A declared intent to produce (`is_production = true`) or consume
/// energy over `[start_time, start_time + duration_secs)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// Quantity of energy committed. Never negative.
    pub energy_amount: Decimal,
    /// Production when `true`, consumption when `false`.
    pub is_production: bool,
    /// When the window opens (assigned by the registry at creation).
    pub start_time: DateTime<Utc>,
    /// Length of the window in seconds.
    pub duration_secs: u64,
    /// Finalized by the settlement engine.
    pub settled: bool,
    /// Folded into the interval ledger.
    pub pool_processed: bool,
    /// Consumed by the settlement engine.
    pub market_processed: bool,
    /// Interval the ledger posted this commitment into, fixed at first posting.
    pub bucket: Option<BucketIndex>,
}

impl Commitment {
    /// A fresh, unprocessed commitment.
    #[must_use]
    pub fn new(
        energy_amount: Decimal,
        is_production: bool,
        start_time: DateTime<Utc>,
        duration_secs: u64,
    ) -> Self {
        Self {
            energy_amount,
            is_production,
            start_time,
            duration_secs,
            settled: false,
            pool_processed: false,
            market_processed: false,
            bucket: None,
        }
    }

    /// End of the commitment window.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.duration_secs).unwrap_or(i64::MAX);
        self.start_time
            .checked_add_signed(Duration::try_seconds(secs).unwrap_or(Duration::MAX))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns `true` once `now` has reached the end of the window.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Amendments are only allowed before settlement and before the ledger
    /// has accounted the commitment.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.settled || self.pool_processed
    }

    /// Human-readable side for logs.
    #[must_use]
    pub fn side_label(&self) -> &'static str {
        if self.is_production {
            "PRODUCTION"
        } else {
            "CONSUMPTION"
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Commitment {
    pub fn dummy_production(amount: Decimal) -> Self {
        Self::new(amount, true, Utc::now(), 3600)
    }

    pub fn dummy_consumption(amount: Decimal) -> Self {
        Self::new(amount, false, Utc::now(), 3600)
    }
}
