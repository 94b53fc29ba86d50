//! # gridsettle-market
//!
//! **Settlement Engine**: buffers pool-processed commitments, sweeps the
//! ones whose window closed, and settles production against consumption
//! in idempotent batches.
//!
//! ## Architecture
//!
//! 1. **PendingBuffer**: FIFO of commitments awaiting a match, one live
//!    entry per commitment
//! 2. **Matcher**: pure greedy pairing of production heads against
//!    consumption heads; no side effects
//! 3. **SettlementEngine**: reads the oracle once per batch, validates the
//!    whole plan, then commits it (all or nothing)
//! 4. **Market**: wires registry, ledger and engine together and admits
//!    deposited commitments to the buffer
//! 5. **SharedMarket**: serializes every operation behind one lock
//!
//! ## Commitment lifecycle (market view)
//!
//! ```text
//! Unbuffered ──add_to_buffer──▶ Buffered ──settle/process──▶ Settled
//!                                   │
//!                                   └──check_expired──▶ Expired (lapsed)
//! ```
//!
//! Settlement is guarded twice: the registry's `market_processed` flag and
//! the ledger's `settled` flag both flip exactly once.

pub mod determinism;
pub mod engine;
pub mod market;
pub mod matcher;
pub mod pending_buffer;
pub mod snapshot;

pub use engine::{EngineState, SettlementEngine};
pub use market::{DepositOutcome, Market, SharedMarket};
pub use matcher::{MatchPlan, plan_matches};
pub use pending_buffer::{BufferEntry, PendingBuffer};
pub use snapshot::MarketSnapshot;
