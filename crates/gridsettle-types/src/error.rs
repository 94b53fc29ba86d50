//! Error types for the GridSettle market.
//!
//! All errors use the `GS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Profile registry errors
//! - 2xx: Custody errors
//! - 3xx: Interval ledger errors
//! - 4xx: Settlement engine errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, CommitmentRef, ProfileId};

/// Central error enum for all GridSettle operations.
#[derive(Debug, Error)]
pub enum GridsettleError {
    // =================================================================
    // Registry Errors (1xx)
    // =================================================================
    /// No profile is registered under this id.
    #[error("GS_ERR_100: Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    /// The profile exists but has no commitment at this index.
    #[error("GS_ERR_101: Commitment not found: {0}")]
    CommitmentNotFound(CommitmentRef),

    /// The caller does not own the profile.
    #[error("GS_ERR_102: Caller {caller} is not the owner of {profile_id}")]
    NotOwner {
        profile_id: ProfileId,
        caller: AccountId,
    },

    /// The commitment is settled or already posted to the ledger.
    #[error("GS_ERR_103: Commitment locked: {0}")]
    CommitmentLocked(CommitmentRef),

    /// The stake sent with a registration is below the configured minimum.
    #[error("GS_ERR_104: Invalid stake: required {required}, provided {provided}")]
    InvalidStake { required: Decimal, provided: Decimal },

    /// Commitment parameters failed validation.
    #[error("GS_ERR_105: Invalid commitment: {reason}")]
    InvalidCommitment { reason: String },

    /// Profile parameters failed validation.
    #[error("GS_ERR_106: Invalid profile: {reason}")]
    InvalidProfile { reason: String },

    // =================================================================
    // Custody Errors (2xx)
    // =================================================================
    /// The caller lacks the authorization required for this operation.
    #[error("GS_ERR_200: Not authorized: {reason}")]
    NotAuthorized { reason: String },

    /// The caller is not the current custodian of the profile.
    #[error("GS_ERR_201: Not custodian of {0}")]
    NotCustodian(ProfileId),

    /// The profile is already held in custody.
    #[error("GS_ERR_202: Profile already in custody: {0}")]
    AlreadyInCustody(ProfileId),

    // =================================================================
    // Ledger Errors (3xx)
    // =================================================================
    /// The commitment has already been settled.
    #[error("GS_ERR_300: Commitment already settled: {0}")]
    AlreadySettled(CommitmentRef),

    /// The commitment has not been accounted by the interval ledger yet.
    #[error("GS_ERR_301: Commitment not pool-processed: {0}")]
    NotPoolProcessed(CommitmentRef),

    /// Interval accumulators disagree with the commitments posted to them.
    #[error("GS_ERR_302: Energy conservation violation: {reason}")]
    EnergyConservationViolation { reason: String },

    // =================================================================
    // Settlement Errors (4xx)
    // =================================================================
    /// The commitment already has a live buffer entry.
    #[error("GS_ERR_400: Commitment already buffered: {0}")]
    AlreadyBuffered(CommitmentRef),

    /// The commitment has already been processed by the settlement engine.
    #[error("GS_ERR_401: Commitment already processed: {0}")]
    AlreadyProcessed(CommitmentRef),

    /// The commitment has no live buffer entry.
    #[error("GS_ERR_402: Commitment not buffered: {0}")]
    NotBuffered(CommitmentRef),

    /// The commitment's window closed before it could be admitted.
    #[error("GS_ERR_403: Commitment expired: {0}")]
    CommitmentExpired(CommitmentRef),

    /// The price oracle produced no usable reading.
    #[error("GS_ERR_404: No oracle price: {reason}")]
    NoOraclePrice { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("GS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("GS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("GS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk).
    #[error("GS_ERR_903: I/O error: {0}")]
    Io(String),

    /// A running total or value would exceed the `Decimal` range.
    #[error("GS_ERR_904: Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GridsettleError>;

impl From<std::io::Error> for GridsettleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GridsettleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
