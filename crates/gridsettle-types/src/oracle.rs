//! Price oracle seam.
//!
//! The oracle is an external collaborator. The settlement engine reads it
//! once per batch and validates the reading before any matching happens.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{GridsettleError, Result, constants};

/// Raw oracle answer: `value / 10^decimals` per unit of energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    pub value: u128,
    pub decimals: u32,
    /// When the feed last updated this reading.
    pub timestamp: DateTime<Utc>,
}

impl PriceReading {
    #[must_use]
    pub fn new(value: u128, decimals: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            value,
            decimals,
            timestamp,
        }
    }

    /// Scaled price per energy unit.
    ///
    /// # Errors
    /// Returns `NoOraclePrice` if the value is zero or cannot be represented.
    pub fn price_per_unit(&self) -> Result<Decimal> {
        if self.value == 0 {
            return Err(GridsettleError::NoOraclePrice {
                reason: "oracle reported a zero price".to_string(),
            });
        }
        if self.decimals > constants::MAX_PRICE_DECIMALS {
            return Err(GridsettleError::NoOraclePrice {
                reason: format!(
                    "{} decimals exceeds supported precision {}",
                    self.decimals,
                    constants::MAX_PRICE_DECIMALS
                ),
            });
        }
        let value = i128::try_from(self.value).map_err(|_| GridsettleError::NoOraclePrice {
            reason: format!("price value {} out of range", self.value),
        })?;
        Decimal::try_from_i128_with_scale(value, self.decimals).map_err(|e| {
            GridsettleError::NoOraclePrice {
                reason: format!("price value {} not representable: {e}", self.value),
            }
        })
    }

    /// Age of the reading relative to `now`, in whole seconds.
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_seconds()
    }
}

/// Supplies the current price per energy unit.
pub trait PriceOracle: Send + Sync {
    fn latest_price(&self) -> Result<PriceReading>;
}

/// An oracle holding a single, externally updated reading.
///
/// Stands in for a push-style feed: whoever owns the feed calls
/// [`FixedPriceOracle::set`], the engine reads whatever is current.
#[derive(Debug, Default)]
pub struct FixedPriceOracle {
    reading: RwLock<Option<PriceReading>>,
}

impl FixedPriceOracle {
    #[must_use]
    pub fn new(reading: PriceReading) -> Self {
        Self {
            reading: RwLock::new(Some(reading)),
        }
    }

    /// An oracle that has never published.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set(&self, reading: PriceReading) {
        let mut guard = self
            .reading
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(reading);
    }
}

impl PriceOracle for FixedPriceOracle {
    fn latest_price(&self) -> Result<PriceReading> {
        let guard = self
            .reading
            .read()
            .map_err(|_| GridsettleError::Internal("price oracle lock poisoned".to_string()))?;
        guard.ok_or_else(|| GridsettleError::NoOraclePrice {
            reason: "oracle has not published a price".to_string(),
        })
    }
}
