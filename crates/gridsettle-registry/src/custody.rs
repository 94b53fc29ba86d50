//! Custody handshake: approve, then take.
//!
//! A profile can only move into ledger custody after its owner has named
//! the custodian. The custodian then takes the profile itself; nothing can
//! seize a profile without explicit owner consent.
//!
//! ```text
//!   owner                       custodian
//!     │ authorize(custodian)       │
//!     ├───────────────────────────▶│
//!     │                            │ take_custody()
//!     │                            │ ... holds profile ...
//!     │                            │ release_custody()  (clears authorization)
//! ```

use gridsettle_types::{AccountId, CustodyState, GridsettleError, ProfileId, Result};

use crate::registry::ProfileRegistry;

impl ProfileRegistry {
    /// Owner names the account allowed to take custody of the profile.
    ///
    /// # Errors
    /// - `NotOwner` if `caller` does not own the profile
    /// - `AlreadyInCustody` while the profile is held
    pub fn authorize_custody_transfer(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
        custodian: AccountId,
    ) -> Result<()> {
        self.require_owner(caller, profile_id)?;
        let profile = self.profile_mut(profile_id)?;
        if profile.custody.is_held() {
            return Err(GridsettleError::AlreadyInCustody(profile_id));
        }
        profile.custody.approved = Some(custodian);

        tracing::debug!(profile = %profile_id, custodian = %custodian, "Custody authorized");
        Ok(())
    }

    /// Owner withdraws a pending authorization.
    ///
    /// # Errors
    /// - `NotOwner` if `caller` does not own the profile
    /// - `AlreadyInCustody` while the profile is held
    pub fn clear_custody_authorization(
        &mut self,
        caller: AccountId,
        profile_id: ProfileId,
    ) -> Result<()> {
        self.require_owner(caller, profile_id)?;
        let profile = self.profile_mut(profile_id)?;
        if profile.custody.is_held() {
            return Err(GridsettleError::AlreadyInCustody(profile_id));
        }
        profile.custody.approved = None;
        Ok(())
    }

    /// Custodian-initiated take. Requires a matching authorization.
    ///
    /// # Errors
    /// - `AlreadyInCustody` if the profile is already held
    /// - `NotAuthorized` if `custodian` was not approved by the owner
    pub fn take_custody(&mut self, custodian: AccountId, profile_id: ProfileId) -> Result<()> {
        let profile = self.profile_mut(profile_id)?;
        if profile.custody.is_held() {
            return Err(GridsettleError::AlreadyInCustody(profile_id));
        }
        if profile.custody.approved != Some(custodian) {
            return Err(GridsettleError::NotAuthorized {
                reason: format!("{custodian} was not approved as custodian of {profile_id}"),
            });
        }
        profile.custody.custodian = Some(custodian);
        Ok(())
    }

    /// Custodian hands the profile back. Clears the authorization too.
    ///
    /// # Errors
    /// Returns `NotCustodian` if `custodian` does not hold the profile.
    pub fn release_custody(&mut self, custodian: AccountId, profile_id: ProfileId) -> Result<()> {
        let profile = self.profile_mut(profile_id)?;
        if !profile.custody.is_held_by(custodian) {
            return Err(GridsettleError::NotCustodian(profile_id));
        }
        profile.custody = CustodyState::default();
        Ok(())
    }

    /// Custody record of a profile.
    pub fn custody(&self, profile_id: ProfileId) -> Result<&CustodyState> {
        Ok(&self.profile(profile_id)?.custody)
    }

    /// Account currently approved for custody, if any.
    pub fn approved_custodian(&self, profile_id: ProfileId) -> Result<Option<AccountId>> {
        Ok(self.custody(profile_id)?.approved)
    }
}
