//! # gridsettle-types
//!
//! Shared types, errors, and configuration for the **GridSettle** energy
//! commitment market.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`ProfileId`], [`CommitmentRef`], [`BucketIndex`]
//! - **Profile model**: [`Profile`], [`CustodyState`]
//! - **Commitment model**: [`Commitment`]
//! - **Interval model**: [`Interval`]
//! - **Settlement model**: [`Fill`], [`SettlementReport`]
//! - **External seams**: [`Clock`], [`PriceOracle`], [`PriceReading`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`GridsettleError`] with `GS_ERR_` prefix codes
//! - **Constants**: system-wide defaults
//! - **Checked arithmetic**: [`amount`] helpers that turn `Decimal`
//!   overflow into [`GridsettleError::Overflow`]

pub mod amount;
pub mod clock;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod interval;
pub mod oracle;
pub mod profile;
pub mod settlement;

// Re-export all primary types at crate root for ergonomic imports:
//   use gridsettle_types::{Commitment, Profile, Interval, ...};

pub use clock::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use interval::*;
pub use oracle::*;
pub use profile::*;
pub use settlement::*;

// Constants are accessed via `gridsettle_types::constants::FOO`
// (not re-exported to avoid name collisions).
