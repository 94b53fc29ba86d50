//! Profile types for the GridSettle registry.
//!
//! A profile is one participant's registered production/consumption
//! capacity plus its append-only commitment history. The registry owns it;
//! the interval ledger may hold **custody** of it while deposited.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Commitment, CommitmentRef, ProfileId};

/// Two-field custody record: the owner approves a custodian, then the
/// custodian takes the profile.
///
/// ```text
///   (none, none) ──authorize──▶ (approved, none) ──take──▶ (approved, held)
///        ▲                                                      │
///        └──────────────────────── release ─────────────────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyState {
    /// Custodian the owner has consented to.
    pub approved: Option<AccountId>,
    /// Custodian currently holding the profile.
    pub custodian: Option<AccountId>,
}

impl CustodyState {
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.custodian.is_some()
    }

    #[must_use]
    pub fn is_held_by(&self, account: AccountId) -> bool {
        self.custodian == Some(account)
    }
}

/// A registered participant profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    /// Account that owns the profile. Never changes.
    pub owner: AccountId,
    /// Declared capacity.
    pub capacity: Decimal,
    /// Free-form location tag (e.g. "Location1").
    pub location: String,
    /// Free-form source tag (e.g. "Solar").
    pub source_type: String,
    /// Stake supplied at registration.
    pub stake: Decimal,
    /// Append-only commitment sequence, addressed by position.
    pub commitments: Vec<Commitment>,
    pub custody: CustodyState,
    pub registered_at: DateTime<Utc>,
}

impl Profile {
    #[must_use]
    pub fn commitment(&self, index: usize) -> Option<&Commitment> {
        self.commitments.get(index)
    }

    #[must_use]
    pub fn commitment_ref(&self, index: usize) -> CommitmentRef {
        CommitmentRef::new(self.id, index)
    }

    /// Refs of commitments the ledger has not accounted yet, in order.
    pub fn unprocessed_refs(&self) -> impl Iterator<Item = CommitmentRef> + '_ {
        self.commitments
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.pool_processed)
            .map(|(i, _)| self.commitment_ref(i))
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Profile {
    pub fn dummy(id: ProfileId, owner: AccountId) -> Self {
        Self {
            id,
            owner,
            capacity: Decimal::new(10, 0),
            location: "Location1".to_string(),
            source_type: "Solar".to_string(),
            stake: Decimal::ZERO,
            commitments: Vec::new(),
            custody: CustodyState::default(),
            registered_at: Utc::now(),
        }
    }
}
