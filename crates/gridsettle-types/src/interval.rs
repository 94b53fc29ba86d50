//! Interval accounting types.
//!
//! An interval is a fixed-width time bucket aggregating the energy of every
//! commitment whose window starts inside it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, amount};

/// Production/consumption accumulators for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub energy_produced: Decimal,
    pub energy_consumed: Decimal,
    /// When the bucket last received a contribution.
    pub last_update: Option<DateTime<Utc>>,
}

impl Interval {
    /// Fold one commitment's energy into the matching accumulator.
    ///
    /// # Errors
    /// Returns `Overflow` and leaves the interval unchanged if the
    /// accumulator would leave the `Decimal` range.
    pub fn record(
        &mut self,
        energy: Decimal,
        is_production: bool,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if is_production {
            self.energy_produced =
                amount::checked_add(self.energy_produced, energy, "interval energy produced")?;
        } else {
            self.energy_consumed =
                amount::checked_add(self.energy_consumed, energy, "interval energy consumed")?;
        }
        self.last_update = Some(at);
        Ok(())
    }

    /// Production minus consumption. Negative when demand exceeds supply.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.energy_produced - self.energy_consumed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.energy_produced.is_zero() && self.energy_consumed.is_zero()
    }
}
