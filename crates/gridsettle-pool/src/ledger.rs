//! Interval ledger: custody plus interval-bucketed energy accounting.
//!
//! Each commitment is posted exactly once: the registry's `pool_processed`
//! flag is flipped together with the bucket credit, and the bucket index is
//! recorded on the commitment so it is never recomputed. Late commitments
//! for past buckets still land in those buckets' historical totals.
//!
//! Posting is staged: every bucket and running total is recomputed with
//! checked arithmetic before any flag is written, so a rejected deposit
//! leaves registry and ledger exactly as they were.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use gridsettle_registry::ProfileRegistry;
use gridsettle_types::{
    AccountId, BucketIndex, Clock, CommitmentRef, EngineConfig, GridsettleError, Interval,
    ProfileId, Result, amount,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the ledger persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    /// The ledger's own identity (custodian and pool authority).
    pub account: AccountId,
    /// The only caller allowed to finalize commitments.
    pub settlement_authority: AccountId,
    /// Interval table keyed by bucket index. Created lazily.
    pub intervals: BTreeMap<BucketIndex, Interval>,
    pub total_energy_produced: Decimal,
    pub total_energy_consumed: Decimal,
}

/// One commitment about to be posted.
struct Posting {
    r: CommitmentRef,
    bucket: BucketIndex,
    amount: Decimal,
    is_production: bool,
}

/// Postings plus the bucket and total values they produce, all checked.
struct StagedPostings {
    postings: Vec<Posting>,
    intervals: BTreeMap<BucketIndex, Interval>,
    total_energy_produced: Decimal,
    total_energy_consumed: Decimal,
}

/// The interval ledger (energy pool).
pub struct IntervalLedger {
    state: LedgerState,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl IntervalLedger {
    /// Create an empty ledger that accepts settlement only from
    /// `settlement_authority`.
    #[must_use]
    pub fn new(
        settlement_authority: AccountId,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_state(
            LedgerState {
                account: AccountId::new(),
                settlement_authority,
                intervals: BTreeMap::new(),
                total_energy_produced: Decimal::ZERO,
                total_energy_consumed: Decimal::ZERO,
            },
            config,
            clock,
        )
    }

    #[must_use]
    pub fn from_state(state: LedgerState, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state,
            config,
            clock,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// The ledger's account: name it in `authorize_custody_transfer`.
    #[must_use]
    pub fn account(&self) -> AccountId {
        self.state.account
    }

    #[must_use]
    pub fn settlement_authority(&self) -> AccountId {
        self.state.settlement_authority
    }

    // =================================================================
    // Custody
    // =================================================================

    /// Take custody of an approved profile and post its unposted commitments.
    ///
    /// Returns the refs posted by this call, in commitment order.
    ///
    /// # Errors
    /// - `AlreadyInCustody` if the profile is already deposited
    /// - `NotAuthorized` if the owner did not approve this ledger, or the
    ///   ledger is not the registry's pool authority
    /// - `Overflow` if a bucket or running total would overflow
    ///
    /// On error custody is not taken and nothing is posted.
    pub fn deposit(
        &mut self,
        registry: &mut ProfileRegistry,
        profile_id: ProfileId,
    ) -> Result<Vec<CommitmentRef>> {
        let staged = self.stage_postings(registry, profile_id)?;
        registry.take_custody(self.state.account, profile_id)?;
        let posted = self.apply_postings(registry, staged)?;

        tracing::info!(
            profile = %profile_id,
            posted = posted.len(),
            "Profile deposited"
        );
        Ok(posted)
    }

    /// Post commitments created after the profile was deposited.
    ///
    /// # Errors
    /// - `NotCustodian` if this ledger does not hold the profile
    /// - `Overflow` if a bucket or running total would overflow, in which
    ///   case nothing is posted
    pub fn post_new_commitments(
        &mut self,
        registry: &mut ProfileRegistry,
        profile_id: ProfileId,
    ) -> Result<Vec<CommitmentRef>> {
        if !self.holds(registry, profile_id)? {
            return Err(GridsettleError::NotCustodian(profile_id));
        }
        let staged = self.stage_postings(registry, profile_id)?;
        self.apply_postings(registry, staged)
    }

    /// Return custody to the owner. Interval totals are left untouched.
    ///
    /// # Errors
    /// - `NotCustodian` if this ledger does not hold the profile
    /// - `NotOwner` if `caller` does not own the profile
    pub fn withdraw(
        &mut self,
        caller: AccountId,
        registry: &mut ProfileRegistry,
        profile_id: ProfileId,
    ) -> Result<()> {
        let profile = registry.profile(profile_id)?;
        if !profile.custody.is_held_by(self.state.account) {
            return Err(GridsettleError::NotCustodian(profile_id));
        }
        if profile.owner != caller {
            return Err(GridsettleError::NotOwner {
                profile_id,
                caller,
            });
        }
        registry.release_custody(self.state.account, profile_id)?;

        tracing::info!(profile = %profile_id, owner = %caller, "Profile withdrawn");
        Ok(())
    }

    /// Whether this ledger currently holds `profile_id`.
    pub fn holds(&self, registry: &ProfileRegistry, profile_id: ProfileId) -> Result<bool> {
        Ok(registry
            .custody(profile_id)?
            .is_held_by(self.state.account))
    }

    /// Compute the effect of posting every unposted commitment of
    /// `profile_id` without writing anything.
    fn stage_postings(
        &self,
        registry: &ProfileRegistry,
        profile_id: ProfileId,
    ) -> Result<StagedPostings> {
        if registry.pool_authority() != Some(self.state.account) {
            return Err(GridsettleError::NotAuthorized {
                reason: format!(
                    "ledger {} is not the registry's pool authority",
                    self.state.account
                ),
            });
        }
        let now = self.clock.now();
        let mut staged = StagedPostings {
            postings: Vec::new(),
            intervals: BTreeMap::new(),
            total_energy_produced: self.state.total_energy_produced,
            total_energy_consumed: self.state.total_energy_consumed,
        };

        for r in registry.profile(profile_id)?.unprocessed_refs() {
            let c = registry.commitment(r)?;
            let bucket = self.bucket_for(c.start_time);
            staged
                .intervals
                .entry(bucket)
                .or_insert_with(|| self.get_interval(bucket))
                .record(c.energy_amount, c.is_production, now)?;
            if c.is_production {
                staged.total_energy_produced = amount::checked_add(
                    staged.total_energy_produced,
                    c.energy_amount,
                    "total energy produced",
                )?;
            } else {
                staged.total_energy_consumed = amount::checked_add(
                    staged.total_energy_consumed,
                    c.energy_amount,
                    "total energy consumed",
                )?;
            }
            staged.postings.push(Posting {
                r,
                bucket,
                amount: c.energy_amount,
                is_production: c.is_production,
            });
        }
        Ok(staged)
    }

    fn apply_postings(
        &mut self,
        registry: &mut ProfileRegistry,
        staged: StagedPostings,
    ) -> Result<Vec<CommitmentRef>> {
        let mut posted = Vec::with_capacity(staged.postings.len());
        for p in &staged.postings {
            registry.mark_pool_processed(self.state.account, p.r, p.bucket)?;
            tracing::debug!(
                commitment = %p.r,
                bucket = p.bucket.0,
                amount = %p.amount,
                production = p.is_production,
                "Commitment posted"
            );
            posted.push(p.r);
        }
        self.state.intervals.extend(staged.intervals);
        self.state.total_energy_produced = staged.total_energy_produced;
        self.state.total_energy_consumed = staged.total_energy_consumed;
        Ok(posted)
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// Finalize a commitment on behalf of the settlement engine.
    ///
    /// # Errors
    /// - `NotAuthorized` if `caller` is not the settlement authority
    /// - `AlreadySettled` if already settled
    /// - `NotPoolProcessed` if the commitment was never posted
    pub fn set_commitment_settled(
        &mut self,
        caller: AccountId,
        registry: &mut ProfileRegistry,
        r: CommitmentRef,
    ) -> Result<()> {
        if caller != self.state.settlement_authority {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("{caller} may not settle commitments"),
            });
        }
        registry.mark_settled(self.state.account, r)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Bucket a timestamp falls into.
    #[must_use]
    pub fn bucket_for(&self, at: DateTime<Utc>) -> BucketIndex {
        BucketIndex::for_time(at, self.config.interval_duration_secs)
    }

    /// Snapshot of one bucket. Untouched buckets read as empty.
    #[must_use]
    pub fn get_interval(&self, bucket: BucketIndex) -> Interval {
        self.state
            .intervals
            .get(&bucket)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of the bucket containing `at`.
    #[must_use]
    pub fn interval_at(&self, at: DateTime<Utc>) -> Interval {
        self.get_interval(self.bucket_for(at))
    }

    /// All buckets that ever received energy, in bucket order.
    pub fn intervals(&self) -> impl Iterator<Item = (BucketIndex, &Interval)> + '_ {
        self.state.intervals.iter().map(|(b, i)| (*b, i))
    }

    #[must_use]
    pub fn total_energy_produced(&self) -> Decimal {
        self.state.total_energy_produced
    }

    #[must_use]
    pub fn total_energy_consumed(&self) -> Decimal {
        self.state.total_energy_consumed
    }

    #[must_use]
    pub fn interval_duration_secs(&self) -> u64 {
        self.config.interval_duration_secs
    }
}
