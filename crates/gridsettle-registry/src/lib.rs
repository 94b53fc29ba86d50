//! # gridsettle-registry
//!
//! **Profile Registry**: the root of truth for who owns a profile and who
//! may create or amend its commitments.
//!
//! ## Responsibilities
//!
//! 1. **Registration**: mints sequential [`ProfileId`]s, enforces the
//!    configured minimum stake, enumerates profiles per owner
//! 2. **Commitments**: append-only sequences, amendable only while unposted
//! 3. **Flag authority**: only the wired pool may mark `pool_processed` /
//!    `settled`, only the wired market may mark `market_processed`
//! 4. **Custody**: owner-approved, custodian-initiated hand-off
//!
//! ## Custody Flow
//!
//! ```text
//! owner: authorize_custody_transfer(ledger) → ledger: take_custody()
//!     → ... → ledger: release_custody()  (clears the authorization)
//! ```
//!
//! [`ProfileId`]: gridsettle_types::ProfileId

pub mod custody;
pub mod registry;

pub use registry::{ProfileRegistry, RegistryState};
