//! Identifiers used throughout GridSettle.
//!
//! Accounts use UUIDv7 for time-ordered sorting. Profiles are numbered
//! sequentially by the registry, and commitments are addressed by their
//! position inside a profile's append-only sequence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a participant or of a component acting as a caller
/// (the interval ledger, the settlement engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ProfileId
// ---------------------------------------------------------------------------

/// Registry-assigned profile identifier. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ProfileId(pub u64);

impl ProfileId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CommitmentRef
// ---------------------------------------------------------------------------

/// Stable handle to one commitment: `(profile, position in its sequence)`.
///
/// Commitments are never removed, so a ref stays valid forever once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CommitmentRef {
    pub profile_id: ProfileId,
    pub index: usize,
}

impl CommitmentRef {
    #[must_use]
    pub fn new(profile_id: ProfileId, index: usize) -> Self {
        Self { profile_id, index }
    }
}

impl fmt::Display for CommitmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.profile_id, self.index)
    }
}

// ---------------------------------------------------------------------------
// BucketIndex
// ---------------------------------------------------------------------------

/// Index of a fixed-width accounting interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BucketIndex(pub i64);

impl BucketIndex {
    /// Bucket containing `at` for intervals `width_secs` wide.
    ///
    /// Uses floor division so instants before the UNIX epoch land in
    /// negative buckets instead of collapsing into bucket zero.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn for_time(at: DateTime<Utc>, width_secs: u64) -> Self {
        let width = width_secs.max(1) as i64;
        Self(at.timestamp().div_euclid(width))
    }

    /// First instant covered by this bucket.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn start_time(self, width_secs: u64) -> Option<DateTime<Utc>> {
        let secs = self.0.checked_mul(width_secs as i64)?;
        DateTime::from_timestamp(secs, 0)
    }
}

impl fmt::Display for BucketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bucket:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
