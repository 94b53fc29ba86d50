//! Profile registry: owns profiles and their commitment sequences.
//!
//! Profiles live in an arena indexed by [`ProfileId`]: ids are handed out
//! sequentially from [`constants::FIRST_PROFILE_ID`], so lookup is a
//! bounds-checked index and nothing is ever removed.

use std::{collections::HashMap, sync::Arc};

use gridsettle_types::{
    AccountId, BucketIndex, Clock, Commitment, CommitmentRef, CustodyState, EngineConfig,
    GridsettleError, Profile, ProfileId, Result, amount, constants,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the registry persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryState {
    /// Account allowed to wire component authorities.
    pub admin: AccountId,
    /// Profiles in id order; `profiles[i].id == FIRST_PROFILE_ID + i`.
    pub profiles: Vec<Profile>,
    /// Account of the interval ledger.
    pub pool_authority: Option<AccountId>,
    /// Account of the settlement engine.
    pub market_authority: Option<AccountId>,
    /// Sum of all registration stakes.
    pub total_staked: Decimal,
}

impl RegistryState {
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            profiles: Vec::new(),
            pool_authority: None,
            market_authority: None,
            total_staked: Decimal::ZERO,
        }
    }
}

/// The profile registry.
///
/// Logical ownership of a profile never leaves the registry. The interval
/// ledger only ever holds custody, recorded in the profile's
/// [`CustodyState`].
pub struct ProfileRegistry {
    pub(crate) state: RegistryState,
    /// Owner → profiles, in registration order. Rebuilt from `state`.
    owners: HashMap<AccountId, Vec<ProfileId>>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl ProfileRegistry {
    /// Create an empty registry administered by `admin`.
    #[must_use]
    pub fn new(admin: AccountId, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(RegistryState::new(admin), config, clock)
    }

    /// Rebuild a registry from persisted state.
    #[must_use]
    pub fn from_state(state: RegistryState, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let mut owners: HashMap<AccountId, Vec<ProfileId>> = HashMap::new();
        for profile in &state.profiles {
            owners.entry(profile.owner).or_default().push(profile.id);
        }
        Self {
            state,
            owners,
            config,
            clock,
        }
    }

    /// Persistable state.
    #[must_use]
    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    #[must_use]
    pub fn admin(&self) -> AccountId {
        self.state.admin
    }

    // =================================================================
    // Component wiring
    // =================================================================

    /// Wire the interval ledger's account. Admin-only, set once.
    pub fn set_pool_authority(&mut self, caller: AccountId, pool: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        Self::wire_once(&mut self.state.pool_authority, pool, "pool")
    }

    /// Wire the settlement engine's account. Admin-only, set once.
    pub fn set_market_authority(&mut self, caller: AccountId, market: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        Self::wire_once(&mut self.state.market_authority, market, "market")
    }

    #[must_use]
    pub fn pool_authority(&self) -> Option<AccountId> {
        self.state.pool_authority
    }

    #[must_use]
    pub fn market_authority(&self) -> Option<AccountId> {
        self.state.market_authority
    }

    fn require_admin(&self, caller: AccountId) -> Result<()> {
        if caller != self.state.admin {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("{caller} is not the registry admin"),
            });
        }
        Ok(())
    }

    fn wire_once(slot: &mut Option<AccountId>, account: AccountId, role: &str) -> Result<()> {
        match *slot {
            Some(existing) if existing != account => Err(GridsettleError::NotAuthorized {
                reason: format!("{role} authority already wired to {existing}"),
            }),
            _ => {
                *slot = Some(account);
                Ok(())
            }
        }
    }

    // =================================================================
    // Registration
    // =================================================================

    /// Register a new profile owned by `account`.
    ///
    /// # Errors
    /// - `InvalidStake` if a minimum stake is configured and not met
    /// - `InvalidProfile` if capacity or stake is negative
    /// - `Overflow` if the stake would overflow the registry's total; no
    ///   profile is created
    pub fn register_user(
        &mut self,
        account: AccountId,
        capacity: Decimal,
        location: impl Into<String>,
        source_type: impl Into<String>,
        stake: Decimal,
    ) -> Result<ProfileId> {
        if capacity.is_sign_negative() {
            return Err(GridsettleError::InvalidProfile {
                reason: format!("capacity must not be negative, got {capacity}"),
            });
        }
        if stake.is_sign_negative() {
            return Err(GridsettleError::InvalidProfile {
                reason: format!("stake must not be negative, got {stake}"),
            });
        }
        if let Some(required) = self.config.minimum_stake {
            if stake < required {
                return Err(GridsettleError::InvalidStake {
                    required,
                    provided: stake,
                });
            }
        }

        let total_staked = amount::checked_add(self.state.total_staked, stake, "total staked")?;

        let id = ProfileId(constants::FIRST_PROFILE_ID + self.state.profiles.len() as u64);
        let profile = Profile {
            id,
            owner: account,
            capacity,
            location: location.into(),
            source_type: source_type.into(),
            stake,
            commitments: Vec::new(),
            custody: CustodyState::default(),
            registered_at: self.clock.now(),
        };

        tracing::info!(
            profile = %id,
            owner = %account,
            capacity = %capacity,
            source = %profile.source_type,
            "Profile registered"
        );

        self.state.profiles.push(profile);
        self.state.total_staked = total_staked;
        self.owners.entry(account).or_default().push(id);
        Ok(id)
    }

    /// Look up a profile.
    pub fn profile(&self, id: ProfileId) -> Result<&Profile> {
        Self::slot(id)
            .and_then(|i| self.state.profiles.get(i))
            .ok_or(GridsettleError::ProfileNotFound(id))
    }

    pub(crate) fn profile_mut(&mut self, id: ProfileId) -> Result<&mut Profile> {
        Self::slot(id)
            .and_then(|i| self.state.profiles.get_mut(i))
            .ok_or(GridsettleError::ProfileNotFound(id))
    }

    fn slot(id: ProfileId) -> Option<usize> {
        id.0
            .checked_sub(constants::FIRST_PROFILE_ID)
            .and_then(|i| usize::try_from(i).ok())
    }

    pub fn owner_of(&self, id: ProfileId) -> Result<AccountId> {
        Ok(self.profile(id)?.owner)
    }

    /// All profiles owned by `account`, in registration order.
    #[must_use]
    pub fn profiles_of(&self, account: AccountId) -> &[ProfileId] {
        self.owners
            .get(&account)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The `index`-th profile owned by `account`.
    #[must_use]
    pub fn profile_of_owner_by_index(&self, account: AccountId, index: usize) -> Option<ProfileId> {
        self.profiles_of(account).get(index).copied()
    }

    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.state.profiles.len()
    }

    #[must_use]
    pub fn total_staked(&self) -> Decimal {
        self.state.total_staked
    }

    pub(crate) fn require_owner(&self, caller: AccountId, id: ProfileId) -> Result<&Profile> {
        let profile = self.profile(id)?;
        if profile.owner != caller {
            return Err(GridsettleError::NotOwner {
                profile_id: id,
                caller,
            });
        }
        Ok(profile)
    }

    // =================================================================
    // Commitments
    // =================================================================

    /// Append a commitment starting now. Returns its index.
    ///
    /// # Errors
    /// - `NotOwner` if `caller` does not own the profile
    /// - `InvalidCommitment` for a negative amount or zero duration
    pub fn create_commitment(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
        energy_amount: Decimal,
        is_production: bool,
        duration_secs: u64,
    ) -> Result<usize> {
        self.require_owner(caller, profile_id)?;
        validate_commitment(energy_amount, duration_secs)?;

        let now = self.clock.now();
        let profile = self.profile_mut(profile_id)?;
        let index = profile.commitments.len();
        profile.commitments.push(Commitment::new(
            energy_amount,
            is_production,
            now,
            duration_secs,
        ));

        tracing::debug!(
            commitment = %CommitmentRef::new(profile_id, index),
            amount = %energy_amount,
            production = is_production,
            duration_secs,
            "Commitment created"
        );
        Ok(index)
    }

    /// Amend a commitment in place. Its start time is kept.
    ///
    /// # Errors
    /// - `NotOwner` if `caller` does not own the profile
    /// - `CommitmentNotFound` if `index` is out of range
    /// - `CommitmentLocked` once the commitment is settled or posted
    pub fn update_commitment(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
        index: usize,
        energy_amount: Decimal,
        is_production: bool,
        duration_secs: u64,
    ) -> Result<()> {
        self.require_owner(caller, profile_id)?;
        validate_commitment(energy_amount, duration_secs)?;

        let r = CommitmentRef::new(profile_id, index);
        let commitment = self.commitment_mut(r)?;
        if commitment.is_locked() {
            return Err(GridsettleError::CommitmentLocked(r));
        }
        commitment.energy_amount = energy_amount;
        commitment.is_production = is_production;
        commitment.duration_secs = duration_secs;

        tracing::info!(
            commitment = %r,
            amount = %energy_amount,
            production = is_production,
            duration_secs,
            "Commitment amended"
        );
        Ok(())
    }

    pub fn get_commitments(&self, profile_id: ProfileId) -> Result<&[Commitment]> {
        Ok(&self.profile(profile_id)?.commitments)
    }

    pub fn get_commitment_count(&self, profile_id: ProfileId) -> Result<usize> {
        Ok(self.profile(profile_id)?.commitments.len())
    }

    pub fn commitment(&self, r: CommitmentRef) -> Result<&Commitment> {
        self.profile(r.profile_id)?
            .commitment(r.index)
            .ok_or(GridsettleError::CommitmentNotFound(r))
    }

    fn commitment_mut(&mut self, r: CommitmentRef) -> Result<&mut Commitment> {
        self.profile_mut(r.profile_id)?
            .commitments
            .get_mut(r.index)
            .ok_or(GridsettleError::CommitmentNotFound(r))
    }

    /// Every commitment across all profiles, in `(profile, index)` order.
    pub fn iter_commitments(&self) -> impl Iterator<Item = (CommitmentRef, &Commitment)> + '_ {
        self.state.profiles.iter().flat_map(|p| {
            p.commitments
                .iter()
                .enumerate()
                .map(move |(i, c)| (CommitmentRef::new(p.id, i), c))
        })
    }

    // =================================================================
    // Flag transitions (component-only)
    // =================================================================

    /// Record that the ledger posted `r` into `bucket`. Pool-only.
    ///
    /// # Errors
    /// - `NotAuthorized` if `caller` is not the wired pool
    /// - `CommitmentLocked` if the commitment was already posted
    pub fn mark_pool_processed(
        &mut self,
        caller: AccountId,
        r: CommitmentRef,
        bucket: BucketIndex,
    ) -> Result<()> {
        self.require_authority(caller, self.state.pool_authority, "pool")?;
        let commitment = self.commitment_mut(r)?;
        if commitment.pool_processed {
            return Err(GridsettleError::CommitmentLocked(r));
        }
        commitment.pool_processed = true;
        commitment.bucket = Some(bucket);
        Ok(())
    }

    /// Finalize `r`. Pool-only.
    ///
    /// # Errors
    /// - `NotAuthorized` if `caller` is not the wired pool
    /// - `AlreadySettled` if already settled
    /// - `NotPoolProcessed` if the ledger has not accounted it
    pub fn mark_settled(&mut self, caller: AccountId, r: CommitmentRef) -> Result<()> {
        self.require_authority(caller, self.state.pool_authority, "pool")?;
        let commitment = self.commitment_mut(r)?;
        if commitment.settled {
            return Err(GridsettleError::AlreadySettled(r));
        }
        if !commitment.pool_processed {
            return Err(GridsettleError::NotPoolProcessed(r));
        }
        commitment.settled = true;
        Ok(())
    }

    /// Record that the settlement engine consumed `r`. Market-only.
    ///
    /// # Errors
    /// - `NotAuthorized` if `caller` is not the wired market
    /// - `AlreadyProcessed` if already consumed
    pub fn mark_market_processed(&mut self, caller: AccountId, r: CommitmentRef) -> Result<()> {
        self.require_authority(caller, self.state.market_authority, "market")?;
        let commitment = self.commitment_mut(r)?;
        if commitment.market_processed {
            return Err(GridsettleError::AlreadyProcessed(r));
        }
        commitment.market_processed = true;
        Ok(())
    }

    fn require_authority(
        &self,
        caller: AccountId,
        authority: Option<AccountId>,
        role: &str,
    ) -> Result<()> {
        if authority != Some(caller) {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("{caller} is not the wired {role} authority"),
            });
        }
        Ok(())
    }

    /// Current time on the registry's clock.
    #[must_use]
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}

fn validate_commitment(energy_amount: Decimal, duration_secs: u64) -> Result<()> {
    if energy_amount.is_sign_negative() {
        return Err(GridsettleError::InvalidCommitment {
            reason: format!("energy amount must not be negative, got {energy_amount}"),
        });
    }
    if duration_secs == 0 {
        return Err(GridsettleError::InvalidCommitment {
            reason: "duration must be at least one second".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsettle_types::ManualClock;

    fn setup() -> (ProfileRegistry, AccountId) {
        let admin = AccountId::new();
        let clock = Arc::new(ManualClock::at_timestamp(1_700_000_000));
        (
            ProfileRegistry::new(admin, EngineConfig::default(), clock),
            admin,
        )
    }

    fn register(reg: &mut ProfileRegistry, owner: AccountId) -> ProfileId {
        reg.register_user(owner, Decimal::new(10, 0), "Location1", "Solar", Decimal::ZERO)
            .unwrap()
    }

    #[test]
    fn register_assigns_sequential_ids() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let bob = AccountId::new();
        let a = register(&mut reg, alice);
        let b = register(&mut reg, bob);
        assert_eq!(a, ProfileId(1));
        assert_eq!(b, ProfileId(2));
        assert_eq!(reg.owner_of(a).unwrap(), alice);
        assert_eq!(reg.profile_count(), 2);
    }

    #[test]
    fn owner_enumeration() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let first = register(&mut reg, alice);
        let second = register(&mut reg, alice);
        assert_eq!(reg.profiles_of(alice), &[first, second]);
        assert_eq!(reg.profile_of_owner_by_index(alice, 1), Some(second));
        assert_eq!(reg.profile_of_owner_by_index(alice, 2), None);
        assert!(reg.profiles_of(AccountId::new()).is_empty());
    }

    #[test]
    fn minimum_stake_enforced() {
        let clock = Arc::new(ManualClock::at_timestamp(0));
        let cfg = EngineConfig::default().with_minimum_stake(Decimal::new(1, 1));
        let mut reg = ProfileRegistry::new(AccountId::new(), cfg, clock);
        let user = AccountId::new();

        let err = reg
            .register_user(user, Decimal::ONE, "L", "Solar", Decimal::new(5, 2))
            .unwrap_err();
        assert!(matches!(err, GridsettleError::InvalidStake { .. }));
        assert_eq!(reg.profile_count(), 0);

        reg.register_user(user, Decimal::ONE, "L", "Solar", Decimal::new(2, 1))
            .unwrap();
        assert_eq!(reg.total_staked(), Decimal::new(2, 1));
    }

    #[test]
    fn stake_overflow_registers_nothing() {
        let (mut reg, _) = setup();
        let (a, b) = (AccountId::new(), AccountId::new());
        let first = reg
            .register_user(a, Decimal::ONE, "L", "Solar", Decimal::MAX)
            .unwrap();

        let err = reg
            .register_user(b, Decimal::ONE, "L", "Solar", Decimal::MAX)
            .unwrap_err();
        assert!(matches!(err, GridsettleError::Overflow(_)));
        assert_eq!(reg.profile_count(), 1);
        assert!(reg.profiles_of(b).is_empty());
        assert_eq!(reg.total_staked(), Decimal::MAX);

        // A zero stake still fits, and takes the next id.
        let second = reg
            .register_user(b, Decimal::ONE, "L", "Solar", Decimal::ZERO)
            .unwrap();
        assert_eq!(second, ProfileId(first.0 + 1));
        assert_eq!(reg.profiles_of(b), &[second]);
    }

    #[test]
    fn negative_capacity_rejected() {
        let (mut reg, _) = setup();
        let err = reg
            .register_user(AccountId::new(), Decimal::NEGATIVE_ONE, "L", "Wind", Decimal::ZERO)
            .unwrap_err();
        assert!(matches!(err, GridsettleError::InvalidProfile { .. }));
    }

    #[test]
    fn create_commitment_appends_with_clock_time() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);

        for amount in [10, 20, 30, 40] {
            reg.create_commitment(alice, pid, Decimal::new(amount, 0), true, 3600)
                .unwrap();
        }

        let commitments = reg.get_commitments(pid).unwrap();
        assert_eq!(reg.get_commitment_count(pid).unwrap(), 4);
        let last = &commitments[3];
        assert_eq!(last.energy_amount, Decimal::new(40, 0));
        assert!(last.is_production);
        assert_eq!(last.start_time.timestamp(), 1_700_000_000);
        assert!(!last.settled && !last.pool_processed && !last.market_processed);
    }

    #[test]
    fn only_owner_can_add_commitment() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let mallory = AccountId::new();
        let pid = register(&mut reg, alice);

        let err = reg
            .create_commitment(mallory, pid, Decimal::new(20, 0), true, 3600)
            .unwrap_err();
        assert!(matches!(err, GridsettleError::NotOwner { .. }));
        assert_eq!(reg.get_commitment_count(pid).unwrap(), 0);
    }

    #[test]
    fn zero_duration_rejected() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);
        let err = reg
            .create_commitment(alice, pid, Decimal::ONE, false, 0)
            .unwrap_err();
        assert!(matches!(err, GridsettleError::InvalidCommitment { .. }));
    }

    #[test]
    fn update_commitment_in_place() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);
        let idx = reg
            .create_commitment(alice, pid, Decimal::new(20, 0), true, 195)
            .unwrap();

        reg.update_commitment(alice, pid, idx, Decimal::new(5, 0), false, 300)
            .unwrap();
        let c = reg.commitment(CommitmentRef::new(pid, idx)).unwrap();
        assert_eq!(c.energy_amount, Decimal::new(5, 0));
        assert!(!c.is_production);
        assert_eq!(c.duration_secs, 300);
    }

    #[test]
    fn update_locked_after_pool_processing() {
        let (mut reg, admin) = setup();
        let pool = AccountId::new();
        reg.set_pool_authority(admin, pool).unwrap();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);
        reg.create_commitment(alice, pid, Decimal::new(20, 0), true, 195)
            .unwrap();
        let r = CommitmentRef::new(pid, 0);
        reg.mark_pool_processed(pool, r, BucketIndex(0)).unwrap();

        let err = reg
            .update_commitment(alice, pid, 0, Decimal::ONE, true, 195)
            .unwrap_err();
        assert!(matches!(err, GridsettleError::CommitmentLocked(_)));
    }

    #[test]
    fn update_missing_index() {
        let (mut reg, _) = setup();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);
        let err = reg
            .update_commitment(alice, pid, 3, Decimal::ONE, true, 195)
            .unwrap_err();
        assert!(matches!(err, GridsettleError::CommitmentNotFound(_)));
    }

    #[test]
    fn flag_transitions_require_wired_authority() {
        let (mut reg, admin) = setup();
        let pool = AccountId::new();
        let market = AccountId::new();
        reg.set_pool_authority(admin, pool).unwrap();
        reg.set_market_authority(admin, market).unwrap();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);
        reg.create_commitment(alice, pid, Decimal::ONE, true, 195)
            .unwrap();
        let r = CommitmentRef::new(pid, 0);

        assert!(matches!(
            reg.mark_pool_processed(market, r, BucketIndex(0)),
            Err(GridsettleError::NotAuthorized { .. })
        ));
        assert!(matches!(
            reg.mark_market_processed(pool, r),
            Err(GridsettleError::NotAuthorized { .. })
        ));
        assert!(matches!(
            reg.mark_settled(pool, r),
            Err(GridsettleError::NotPoolProcessed(_))
        ));

        reg.mark_pool_processed(pool, r, BucketIndex(0)).unwrap();
        reg.mark_market_processed(market, r).unwrap();
        reg.mark_settled(pool, r).unwrap();

        assert!(matches!(
            reg.mark_settled(pool, r),
            Err(GridsettleError::AlreadySettled(_))
        ));
        assert!(matches!(
            reg.mark_market_processed(market, r),
            Err(GridsettleError::AlreadyProcessed(_))
        ));
        let c = reg.commitment(r).unwrap();
        assert!(c.settled && c.pool_processed && c.market_processed);
        assert_eq!(c.bucket, Some(BucketIndex(0)));
    }

    #[test]
    fn wiring_is_admin_only_and_set_once() {
        let (mut reg, admin) = setup();
        let pool = AccountId::new();
        assert!(matches!(
            reg.set_pool_authority(AccountId::new(), pool),
            Err(GridsettleError::NotAuthorized { .. })
        ));
        reg.set_pool_authority(admin, pool).unwrap();
        reg.set_pool_authority(admin, pool).unwrap();
        assert!(reg.set_pool_authority(admin, AccountId::new()).is_err());
        assert_eq!(reg.pool_authority(), Some(pool));
    }

    #[test]
    fn from_state_rebuilds_owner_index() {
        let (mut reg, admin) = setup();
        let alice = AccountId::new();
        let pid = register(&mut reg, alice);
        let json = serde_json::to_string(reg.state()).unwrap();
        let state: RegistryState = serde_json::from_str(&json).unwrap();

        let restored = ProfileRegistry::from_state(
            state,
            EngineConfig::default(),
            Arc::new(ManualClock::at_timestamp(0)),
        );
        assert_eq!(restored.admin(), admin);
        assert_eq!(restored.profiles_of(alice), &[pid]);
    }

    #[test]
    fn hand_built_state_is_enumerable() {
        let admin = AccountId::new();
        let owner = AccountId::new();
        let mut profile = Profile::dummy(ProfileId(1), owner);
        profile
            .commitments
            .push(Commitment::dummy_production(Decimal::new(4, 0)));
        profile
            .commitments
            .push(Commitment::dummy_consumption(Decimal::ONE));
        let mut state = RegistryState::new(admin);
        state.profiles.push(profile);

        let reg = ProfileRegistry::from_state(
            state,
            EngineConfig::default(),
            Arc::new(ManualClock::at_timestamp(0)),
        );
        let refs: Vec<_> = reg.iter_commitments().map(|(r, _)| r).collect();
        assert_eq!(
            refs,
            vec![
                CommitmentRef::new(ProfileId(1), 0),
                CommitmentRef::new(ProfileId(1), 1)
            ]
        );
        assert_eq!(reg.profile_of_owner_by_index(owner, 0), Some(ProfileId(1)));
        assert_eq!(reg.get_commitment_count(ProfileId(1)).unwrap(), 2);
    }

    #[test]
    fn unknown_profile() {
        let (reg, _) = setup();
        assert!(matches!(
            reg.profile(ProfileId(99)),
            Err(GridsettleError::ProfileNotFound(_))
        ));
        assert!(matches!(
            reg.profile(ProfileId(0)),
            Err(GridsettleError::ProfileNotFound(_))
        ));
    }
}
