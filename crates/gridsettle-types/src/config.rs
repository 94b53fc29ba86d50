//! Engine configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{GridsettleError, Result, constants};

/// Configuration shared by the registry, ledger and settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of one accounting interval, in seconds.
    pub interval_duration_secs: u64,
    /// Maximum accepted age of an oracle reading, in seconds.
    pub settlement_staleness_secs: u64,
    /// Minimum stake required to register a profile, if any.
    pub minimum_stake: Option<Decimal>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_duration_secs: constants::DEFAULT_INTERVAL_DURATION_SECS,
            settlement_staleness_secs: constants::DEFAULT_SETTLEMENT_STALENESS_SECS,
            minimum_stake: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| GridsettleError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_duration_secs == 0 {
            return Err(GridsettleError::Configuration(
                "interval_duration_secs must be > 0".to_string(),
            ));
        }
        if self.settlement_staleness_secs == 0 {
            return Err(GridsettleError::Configuration(
                "settlement_staleness_secs must be > 0".to_string(),
            ));
        }
        if let Some(stake) = self.minimum_stake {
            if stake.is_sign_negative() {
                return Err(GridsettleError::Configuration(format!(
                    "minimum_stake must not be negative, got {stake}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_minimum_stake(mut self, stake: Decimal) -> Self {
        self.minimum_stake = Some(stake);
        self
    }
}
