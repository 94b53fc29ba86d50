//! Market facade: registry, ledger and settlement engine behind one API.
//!
//! Control flow follows ownership of the data:
//!
//! ```text
//!   owner ──register/commit──▶ ProfileRegistry
//!   owner ──authorize────────▶ ProfileRegistry ◀──take/post── IntervalLedger
//!                                                                │ posted refs
//!                                                                ▼
//!                                                     SettlementEngine buffer
//!                                                                │ settle
//!                                            registry flags ◀────┘
//! ```
//!
//! [`SharedMarket`] serializes every call behind a single mutex: each
//! operation sees the state left by the previous one and nothing else.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use gridsettle_pool::{EnergyConservation, IntervalLedger};
use gridsettle_registry::ProfileRegistry;
use gridsettle_types::{
    AccountId, BucketIndex, Clock, Commitment, CommitmentRef, EngineConfig, GridsettleError,
    Interval, PriceOracle, ProfileId, Result, SettlementReport, constants,
};
use rust_decimal::Decimal;

use crate::{engine::SettlementEngine, snapshot::MarketSnapshot};

/// What a deposit (or a later posting) did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositOutcome {
    /// Commitments the ledger posted into interval buckets.
    pub posted: Vec<CommitmentRef>,
    /// Posted commitments admitted to the settlement buffer. Commitments
    /// whose window had already closed are posted but not admitted.
    pub admitted: Vec<CommitmentRef>,
}

/// The wired system.
pub struct Market {
    registry: ProfileRegistry,
    ledger: IntervalLedger,
    engine: SettlementEngine,
    oracle: Arc<dyn PriceOracle>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl Market {
    /// Build an empty market and wire the component authorities.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn new(
        admin: AccountId,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Self> {
        config.validate()?;
        let engine = SettlementEngine::new(config.clone(), clock.clone());
        let ledger = IntervalLedger::new(engine.account(), config.clone(), clock.clone());
        let mut registry = ProfileRegistry::new(admin, config.clone(), clock.clone());
        registry.set_pool_authority(admin, ledger.account())?;
        registry.set_market_authority(admin, engine.account())?;

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            ledger = %ledger.account(),
            market = %engine.account(),
            interval_secs = config.interval_duration_secs,
            "Market initialized"
        );
        Ok(Self {
            registry,
            ledger,
            engine,
            oracle,
            config,
            clock,
        })
    }

    /// Rebuild a market from a snapshot.
    ///
    /// # Errors
    /// - `Configuration` if `config` does not validate or the snapshot's
    ///   component accounts are not wired to each other
    /// - `AlreadyBuffered` if the snapshot's buffer is inconsistent
    pub fn restore(
        snapshot: MarketSnapshot,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Self> {
        config.validate()?;
        snapshot.check_version()?;
        let MarketSnapshot {
            registry,
            ledger,
            engine,
            ..
        } = snapshot;

        if registry.pool_authority != Some(ledger.account)
            || registry.market_authority != Some(engine.account)
            || ledger.settlement_authority != engine.account
        {
            return Err(GridsettleError::Configuration(
                "snapshot components are not wired to each other".to_string(),
            ));
        }

        let registry = ProfileRegistry::from_state(registry, config.clone(), clock.clone());
        let ledger = IntervalLedger::from_state(ledger, config.clone(), clock.clone());
        let engine = SettlementEngine::from_state(engine, config.clone(), clock.clone())?;

        tracing::info!(
            profiles = registry.profile_count(),
            buffered = engine.get_buffer_length(),
            rounds = engine.rounds(),
            "Market restored"
        );
        Ok(Self {
            registry,
            ledger,
            engine,
            oracle,
            config,
            clock,
        })
    }

    /// Capture the full persisted state.
    #[must_use]
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot::new(
            self.registry.state().clone(),
            self.ledger.state().clone(),
            self.engine.state(),
            self.clock.now(),
        )
    }

    /// Snapshot straight to a JSON file.
    ///
    /// # Errors
    /// Returns `Io` or `Serialization` on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.snapshot().save(path)
    }

    // =================================================================
    // Registry
    // =================================================================

    /// # Errors
    /// See [`ProfileRegistry::register_user`].
    pub fn register_user(
        &mut self,
        account: AccountId,
        capacity: Decimal,
        location: impl Into<String>,
        source_type: impl Into<String>,
        stake: Decimal,
    ) -> Result<ProfileId> {
        self.registry
            .register_user(account, capacity, location, source_type, stake)
    }

    /// # Errors
    /// See [`ProfileRegistry::create_commitment`].
    pub fn create_commitment(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
        energy_amount: Decimal,
        is_production: bool,
        duration_secs: u64,
    ) -> Result<usize> {
        self.registry.create_commitment(
            caller,
            profile_id,
            energy_amount,
            is_production,
            duration_secs,
        )
    }

    /// # Errors
    /// See [`ProfileRegistry::update_commitment`].
    pub fn update_commitment(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
        index: usize,
        energy_amount: Decimal,
        is_production: bool,
        duration_secs: u64,
    ) -> Result<()> {
        self.registry.update_commitment(
            caller,
            profile_id,
            index,
            energy_amount,
            is_production,
            duration_secs,
        )
    }

    /// # Errors
    /// Returns `ProfileNotFound` for an unknown profile.
    pub fn get_commitments(&self, profile_id: ProfileId) -> Result<&[Commitment]> {
        self.registry.get_commitments(profile_id)
    }

    /// # Errors
    /// Returns `ProfileNotFound` for an unknown profile.
    pub fn get_commitment_count(&self, profile_id: ProfileId) -> Result<usize> {
        self.registry.get_commitment_count(profile_id)
    }

    // =================================================================
    // Custody
    // =================================================================

    /// Owner approves this market's ledger as custodian.
    ///
    /// # Errors
    /// See [`ProfileRegistry::authorize_custody_transfer`].
    pub fn authorize_custody_transfer(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
    ) -> Result<()> {
        self.registry
            .authorize_custody_transfer(caller, profile_id, self.ledger.account())
    }

    /// # Errors
    /// See [`ProfileRegistry::clear_custody_authorization`].
    pub fn clear_custody_authorization(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
    ) -> Result<()> {
        self.registry.clear_custody_authorization(caller, profile_id)
    }

    /// Deposit a profile and queue its newly posted commitments for
    /// settlement.
    ///
    /// # Errors
    /// See [`IntervalLedger::deposit`]. Admission failures other than an
    /// already-closed window are propagated.
    pub fn deposit(&mut self, profile_id: ProfileId) -> Result<DepositOutcome> {
        let posted = self.ledger.deposit(&mut self.registry, profile_id)?;
        self.admit(posted)
    }

    /// Post and queue commitments created while the ledger holds custody.
    ///
    /// # Errors
    /// See [`IntervalLedger::post_new_commitments`].
    pub fn post_new_commitments(&mut self, profile_id: ProfileId) -> Result<DepositOutcome> {
        let posted = self
            .ledger
            .post_new_commitments(&mut self.registry, profile_id)?;
        self.admit(posted)
    }

    /// # Errors
    /// See [`IntervalLedger::withdraw`].
    pub fn withdraw(&mut self, caller: AccountId, profile_id: ProfileId) -> Result<()> {
        self.ledger.withdraw(caller, &mut self.registry, profile_id)
    }

    fn admit(&mut self, posted: Vec<CommitmentRef>) -> Result<DepositOutcome> {
        let mut admitted = Vec::with_capacity(posted.len());
        for r in &posted {
            match self.engine.add_to_buffer(&self.registry, *r) {
                Ok(()) => admitted.push(*r),
                Err(GridsettleError::CommitmentExpired(_)) => {
                    tracing::debug!(
                        commitment = %r,
                        "Posted commitment already closed, not buffered"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(DepositOutcome { posted, admitted })
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// # Errors
    /// See [`SettlementEngine::add_to_buffer`].
    pub fn add_to_buffer(&mut self, r: CommitmentRef) -> Result<()> {
        self.engine.add_to_buffer(&self.registry, r)
    }

    pub fn check_expired_commitments(&mut self) -> Vec<CommitmentRef> {
        self.engine.check_expired_commitments()
    }

    /// See [`SettlementEngine::drain_lapsed`].
    pub fn drain_lapsed(&mut self) -> Vec<CommitmentRef> {
        self.engine.drain_lapsed()
    }

    /// # Errors
    /// See [`SettlementEngine::process_commitment`].
    pub fn process_commitment(&mut self, r: CommitmentRef) -> Result<()> {
        self.engine
            .process_commitment(&mut self.registry, &mut self.ledger, r)
    }

    /// Run a settlement round against the market's oracle.
    ///
    /// # Errors
    /// See [`SettlementEngine::settle_commitment`].
    pub fn settle_commitment(&mut self) -> Result<SettlementReport> {
        self.engine
            .settle_commitment(&mut self.registry, &mut self.ledger, self.oracle.as_ref())
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn get_interval(&self, bucket: BucketIndex) -> Interval {
        self.ledger.get_interval(bucket)
    }

    #[must_use]
    pub fn interval_at(&self, at: DateTime<Utc>) -> Interval {
        self.ledger.interval_at(at)
    }

    #[must_use]
    pub fn get_buffer_length(&self) -> usize {
        self.engine.get_buffer_length()
    }

    /// # Errors
    /// Returns `EnergyConservationViolation` if the ledger disagrees with
    /// the registry.
    pub fn verify_conservation(&self) -> Result<()> {
        EnergyConservation::verify(&self.ledger, &self.registry)
    }

    #[must_use]
    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    #[must_use]
    pub fn ledger(&self) -> &IntervalLedger {
        &self.ledger
    }

    #[must_use]
    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Cloneable handle that runs market operations one at a time.
#[derive(Clone)]
pub struct SharedMarket {
    inner: Arc<Mutex<Market>>,
}

impl SharedMarket {
    #[must_use]
    pub fn new(market: Market) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    /// Run `op` with exclusive access to the market.
    ///
    /// # Errors
    /// Returns `Internal` if a previous operation panicked while holding
    /// the lock; otherwise whatever `op` returns.
    pub fn execute<T>(&self, op: impl FnOnce(&mut Market) -> Result<T>) -> Result<T> {
        let mut market = self
            .inner
            .lock()
            .map_err(|_| GridsettleError::Internal("market lock poisoned".to_string()))?;
        op(&mut market)
    }

    /// Read-only access.
    ///
    /// # Errors
    /// Returns `Internal` if the lock is poisoned.
    pub fn read<T>(&self, op: impl FnOnce(&Market) -> T) -> Result<T> {
        let market = self
            .inner
            .lock()
            .map_err(|_| GridsettleError::Internal("market lock poisoned".to_string()))?;
        Ok(op(&market))
    }
}
