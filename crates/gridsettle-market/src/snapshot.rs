//! JSON snapshots of the whole market.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use gridsettle_pool::LedgerState;
use gridsettle_registry::RegistryState;
use gridsettle_types::{GridsettleError, Result, constants};
use serde::{Deserialize, Serialize};

use crate::engine::EngineState;

/// Persisted state of registry, ledger and engine, taken at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub version: u32,
    pub taken_at: DateTime<Utc>,
    pub registry: RegistryState,
    pub ledger: LedgerState,
    pub engine: EngineState,
}

impl MarketSnapshot {
    #[must_use]
    pub fn new(
        registry: RegistryState,
        ledger: LedgerState,
        engine: EngineState,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: constants::SNAPSHOT_VERSION,
            taken_at,
            registry,
            ledger,
            engine,
        }
    }

    /// # Errors
    /// Returns `Serialization` if the snapshot was written by an
    /// incompatible build.
    pub fn check_version(&self) -> Result<()> {
        if self.version != constants::SNAPSHOT_VERSION {
            return Err(GridsettleError::Serialization(format!(
                "snapshot version {} unsupported, expected {}",
                self.version,
                constants::SNAPSHOT_VERSION
            )));
        }
        Ok(())
    }

    /// # Errors
    /// Returns `Serialization` on encoder failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// Returns `Serialization` on malformed input or a version mismatch.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns `Io` or `Serialization` on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "Snapshot saved");
        Ok(())
    }

    /// # Errors
    /// Returns `Io` or `Serialization` on failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), "Snapshot loaded");
        Ok(snapshot)
    }
}
