//! Settlement engine.
//!
//! Holds the pending-settlement buffer and finalizes commitments against
//! the registry and the interval ledger. A settlement round runs in two
//! phases:
//!
//! 1. **Plan**: read the oracle once, sweep nothing, match the live
//!    entries, compute fill values and check every completed commitment is
//!    still settleable. Any error here leaves all state untouched.
//! 2. **Apply**: write back carried quantities, then finalize each
//!    completed commitment (`market_processed`, then `settled`) and drop
//!    it from the buffer.
//!
//! Finalization is idempotent in the strong sense: a commitment that has
//! been market-processed is rejected with `AlreadyProcessed` before any
//! state is touched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gridsettle_pool::IntervalLedger;
use gridsettle_registry::ProfileRegistry;
use gridsettle_types::{
    AccountId, Clock, CommitmentRef, EngineConfig, Fill, GridsettleError, PriceOracle,
    PriceReading, Result, SettlementReport, amount,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    determinism,
    matcher::{self, MatchPlan},
    pending_buffer::{BufferEntry, PendingBuffer},
};

/// Everything the engine persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    /// The engine's identity (market authority and settlement authority).
    pub account: AccountId,
    /// Buffered entries in admission order.
    pub buffer: Vec<BufferEntry>,
    pub next_sequence: u64,
    /// Completed settlement rounds.
    pub rounds: u64,
    /// Commitments swept out of the buffer after their window closed and
    /// not yet drained by the operator. Append-only between drains.
    pub lapsed: Vec<CommitmentRef>,
}

/// The settlement engine (market).
pub struct SettlementEngine {
    account: AccountId,
    buffer: PendingBuffer,
    rounds: u64,
    lapsed: Vec<CommitmentRef>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl SettlementEngine {
    /// Create an engine with a fresh account and an empty buffer.
    #[must_use]
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            account: AccountId::new(),
            buffer: PendingBuffer::new(),
            rounds: 0,
            lapsed: Vec::new(),
            config,
            clock,
        }
    }

    /// Rebuild an engine from persisted state.
    ///
    /// # Errors
    /// Returns `AlreadyBuffered` if the persisted buffer lists a commitment twice.
    pub fn from_state(
        state: EngineState,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            account: state.account,
            buffer: PendingBuffer::restore(state.buffer, state.next_sequence)?,
            rounds: state.rounds,
            lapsed: state.lapsed,
            config,
            clock,
        })
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        EngineState {
            account: self.account,
            buffer: self.buffer.entries().to_vec(),
            next_sequence: self.buffer.next_sequence(),
            rounds: self.rounds,
            lapsed: self.lapsed.clone(),
        }
    }

    /// Account to register as the registry's market authority and the
    /// ledger's settlement authority.
    #[must_use]
    pub fn account(&self) -> AccountId {
        self.account
    }

    // =================================================================
    // Buffer admission
    // =================================================================

    /// Admit a posted, unsettled commitment to the buffer.
    ///
    /// # Errors
    /// - `CommitmentNotFound` if the reference does not resolve
    /// - `NotPoolProcessed` if the ledger has not posted it
    /// - `AlreadySettled` / `AlreadyProcessed` if it was finalized
    /// - `AlreadyBuffered` if it already has an entry
    /// - `CommitmentExpired` if its window has closed
    pub fn add_to_buffer(&mut self, registry: &ProfileRegistry, r: CommitmentRef) -> Result<()> {
        let commitment = registry.commitment(r)?;
        if !commitment.pool_processed {
            return Err(GridsettleError::NotPoolProcessed(r));
        }
        if commitment.settled {
            return Err(GridsettleError::AlreadySettled(r));
        }
        if commitment.market_processed {
            return Err(GridsettleError::AlreadyProcessed(r));
        }
        if self.buffer.contains(r) {
            return Err(GridsettleError::AlreadyBuffered(r));
        }
        let now = self.clock.now();
        let expires_at = commitment.expires_at();
        if now >= expires_at {
            return Err(GridsettleError::CommitmentExpired(r));
        }

        let sequence = self.buffer.push(
            r,
            commitment.is_production,
            commitment.energy_amount,
            expires_at,
            now,
        )?;

        tracing::debug!(
            commitment = %r,
            side = commitment.side_label(),
            amount = %commitment.energy_amount,
            sequence,
            "Commitment buffered"
        );
        Ok(())
    }

    /// Remove every buffered commitment whose window has closed.
    ///
    /// Returns the lapsed references in admission order. They stay
    /// unsettled; they are also appended to [`Self::lapsed`] until
    /// [`Self::drain_lapsed`] collects them.
    pub fn check_expired_commitments(&mut self) -> Vec<CommitmentRef> {
        let now = self.clock.now();
        let expired: Vec<CommitmentRef> = self
            .buffer
            .drain_expired(now)
            .into_iter()
            .map(|e| {
                tracing::warn!(
                    commitment = %e.commitment,
                    expired_at = %e.expires_at,
                    unmatched = %e.remaining,
                    "Commitment lapsed unsettled"
                );
                e.commitment
            })
            .collect();
        self.lapsed.extend_from_slice(&expired);
        expired
    }

    // =================================================================
    // Finalization
    // =================================================================

    /// Finalize one buffered commitment outside of a matching round.
    ///
    /// # Errors
    /// - `AlreadyProcessed` if it was already market-processed (no state change)
    /// - `NotBuffered` if it has no buffer entry
    /// - `AlreadySettled` / `NotPoolProcessed` from the ledger's preconditions
    /// - `NotAuthorized` if the engine is not wired as both authorities
    pub fn process_commitment(
        &mut self,
        registry: &mut ProfileRegistry,
        ledger: &mut IntervalLedger,
        r: CommitmentRef,
    ) -> Result<()> {
        self.require_wired(registry, ledger)?;
        self.check_processable(registry, r)?;
        self.finalize(registry, ledger, r)?;

        tracing::info!(commitment = %r, "Commitment processed");
        Ok(())
    }

    /// Run one settlement round over the live buffer.
    ///
    /// Reads the oracle once and applies that price to every fill. Entries
    /// whose window has closed are skipped (and left for
    /// [`Self::check_expired_commitments`]).
    ///
    /// # Errors
    /// - `NoOraclePrice` if the oracle fails, reports zero, or is stale
    /// - `Overflow` if a fill value or the round's total value leaves the
    ///   `Decimal` range
    /// - `NotAuthorized` if the engine is not wired as both authorities
    /// - any finalization precondition failure of a completed commitment
    ///
    /// On error nothing has been changed.
    pub fn settle_commitment(
        &mut self,
        registry: &mut ProfileRegistry,
        ledger: &mut IntervalLedger,
        oracle: &dyn PriceOracle,
    ) -> Result<SettlementReport> {
        self.require_wired(registry, ledger)?;
        let now = self.clock.now();
        let (price, reading) = self.read_price(oracle, now)?;

        // Plan
        let plan = matcher::plan_matches(self.buffer.live(now));
        let matched = plan.matched_energy()?;
        let fills = Self::price_fills(&plan, price)?;
        let value = amount::checked_sum(fills.iter().map(|f| f.value), "round value")?;
        for r in &plan.completed {
            self.check_processable(registry, *r)?;
        }

        // Apply
        for (r, remaining) in &plan.carried {
            self.buffer.set_remaining(*r, *remaining)?;
        }
        for r in &plan.completed {
            self.finalize(registry, ledger, *r)?;
        }
        self.rounds += 1;
        for fill in &fills {
            tracing::debug!(
                round = self.rounds,
                production = %fill.production,
                consumption = %fill.consumption,
                quantity = %fill.quantity,
                value = %fill.value,
                "Fill"
            );
        }

        let settlement_root = determinism::compute_settlement_root(self.rounds, price, &fills);
        let report = SettlementReport {
            round: self.rounds,
            price,
            price_timestamp: reading.timestamp,
            fills,
            settled: plan.completed,
            carried: plan.carried,
            settlement_root,
            settled_at: now,
        };

        tracing::info!(
            round = report.round,
            price = %report.price,
            fills = report.fills.len(),
            settled = report.settled.len(),
            carried = report.carried.len(),
            matched = %matched,
            value = %value,
            root = %determinism::root_hex(&report.settlement_root),
            "Settlement round complete"
        );
        Ok(report)
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn get_buffer_length(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_buffered(&self, r: CommitmentRef) -> bool {
        self.buffer.contains(r)
    }

    /// Unmatched quantity of a buffered commitment.
    #[must_use]
    pub fn remaining(&self, r: CommitmentRef) -> Option<Decimal> {
        self.buffer.get(r).map(|e| e.remaining)
    }

    #[must_use]
    pub fn buffer_entries(&self) -> &[BufferEntry] {
        self.buffer.entries()
    }

    /// Commitments swept as expired since the last drain, oldest first.
    #[must_use]
    pub fn lapsed(&self) -> &[CommitmentRef] {
        &self.lapsed
    }

    /// Hand the lapsed history to the caller and start a new one.
    ///
    /// The history is persisted with every snapshot, so operators drain it
    /// once it has been reported.
    pub fn drain_lapsed(&mut self) -> Vec<CommitmentRef> {
        let drained = std::mem::take(&mut self.lapsed);
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "Lapsed history drained");
        }
        drained
    }

    #[must_use]
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    // =================================================================
    // Internals
    // =================================================================

    fn require_wired(&self, registry: &ProfileRegistry, ledger: &IntervalLedger) -> Result<()> {
        if registry.market_authority() != Some(self.account) {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("engine {} is not the registry's market authority", self.account),
            });
        }
        if ledger.settlement_authority() != self.account {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("engine {} is not the ledger's settlement authority", self.account),
            });
        }
        if registry.pool_authority() != Some(ledger.account()) {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("ledger {} is not the registry's pool authority", ledger.account()),
            });
        }
        Ok(())
    }

    /// Everything `finalize` needs, checked without writing.
    fn check_processable(&self, registry: &ProfileRegistry, r: CommitmentRef) -> Result<()> {
        let commitment = registry.commitment(r)?;
        if commitment.market_processed {
            return Err(GridsettleError::AlreadyProcessed(r));
        }
        if !self.buffer.contains(r) {
            return Err(GridsettleError::NotBuffered(r));
        }
        if commitment.settled {
            return Err(GridsettleError::AlreadySettled(r));
        }
        if !commitment.pool_processed {
            return Err(GridsettleError::NotPoolProcessed(r));
        }
        Ok(())
    }

    fn finalize(
        &mut self,
        registry: &mut ProfileRegistry,
        ledger: &mut IntervalLedger,
        r: CommitmentRef,
    ) -> Result<()> {
        registry.mark_market_processed(self.account, r)?;
        ledger.set_commitment_settled(self.account, registry, r)?;
        self.buffer.remove(r);
        Ok(())
    }

    /// Read and validate the oracle.
    fn read_price(
        &self,
        oracle: &dyn PriceOracle,
        now: DateTime<Utc>,
    ) -> Result<(Decimal, PriceReading)> {
        let reading = oracle.latest_price().map_err(|e| match e {
            GridsettleError::NoOraclePrice { .. } => e,
            other => GridsettleError::NoOraclePrice {
                reason: format!("oracle read failed: {other}"),
            },
        })?;

        let age = reading.age_secs(now);
        let max_age = i64::try_from(self.config.settlement_staleness_secs).unwrap_or(i64::MAX);
        if age > max_age {
            tracing::warn!(age, max_age, "Oracle price is stale");
            return Err(GridsettleError::NoOraclePrice {
                reason: format!("reading is {age}s old, limit is {max_age}s"),
            });
        }

        let price = reading.price_per_unit().inspect_err(|e| {
            tracing::warn!(error = %e, "Oracle price rejected");
        })?;
        Ok((price, reading))
    }

    fn price_fills(plan: &MatchPlan, price: Decimal) -> Result<Vec<Fill>> {
        plan.fills
            .iter()
            .map(|f| {
                let value = f.quantity.checked_mul(price).ok_or_else(|| {
                    GridsettleError::Overflow(format!("fill value: {} x {price}", f.quantity))
                })?;
                Ok(Fill {
                    production: f.production,
                    consumption: f.consumption,
                    quantity: f.quantity,
                    value,
                })
            })
            .collect()
    }
}
