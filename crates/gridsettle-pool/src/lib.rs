//! # gridsettle-pool
//!
//! **Interval Ledger**: takes custody of deposited profiles and accounts
//! their commitments into fixed-width time buckets.
//!
//! ## Architecture
//!
//! 1. **Deposit**: custodian-side take of an owner-approved profile, then
//!    every unposted commitment is folded into its start-time bucket
//! 2. **Withdraw**: custody goes back to the owner; interval totals stay
//!    (they are history, not a reservation)
//! 3. **Settlement flag**: the settlement engine finalizes commitments
//!    through the ledger, never directly
//! 4. **Conservation**: interval accumulators always equal the sum of the
//!    commitments posted into them
//!
//! ```text
//! Registry ──authorize──▶ IntervalLedger.deposit() ──posted refs──▶ SettlementEngine
//! ```

pub mod conservation;
pub mod ledger;

pub use conservation::EnergyConservation;
pub use ledger::{IntervalLedger, LedgerState};
