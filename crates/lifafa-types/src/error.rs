//! Error types for the Lifafa envelope escrow.
//!
//! All errors use the `LF_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (rejected at `create`, nothing touched)
//! - 2xx: Identity / state conflicts (rejected before any mutation)
//! - 3xx: Funds / vault faults (bookkeeping inconsistencies, never clamped)
//! - 9xx: General / internal errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{EnvelopeId, Identity};

/// Central error enum for all Lifafa operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifafaError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The claim mode code is the `None` sentinel or unknown.
    #[error("LF_ERR_100: Invalid claim mode: {0}")]
    InvalidClaimMode(u8),

    /// The deposit amount is zero or cannot cover the claim ceiling.
    #[error("LF_ERR_101: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// `max_claims` is zero.
    #[error("LF_ERR_102: Invalid max claims: must be at least 1")]
    InvalidMaxClaims,

    /// `max_claims` is above the configured ceiling.
    #[error("LF_ERR_103: Max claims limit exceeded: requested {requested}, limit {limit}")]
    MaxClaimsLimitExceeded { requested: u64, limit: u64 },

    /// The time window is negative or not representable.
    #[error("LF_ERR_104: Invalid time limit: {0}s")]
    InvalidTimeLimit(i64),

    /// Owner display name is longer than allowed.
    #[error("LF_ERR_105: Owner name too long: {len} bytes, max {max}")]
    OwnerNameTooLong { len: usize, max: usize },

    /// Description is longer than allowed.
    #[error("LF_ERR_106: Description too long: {len} bytes, max {max}")]
    DescriptionTooLong { len: usize, max: usize },

    // =================================================================
    // Identity / State Errors (2xx)
    // =================================================================
    /// A live envelope already occupies this id.
    #[error("LF_ERR_200: Envelope already exists: {0}")]
    AlreadyExists(EnvelopeId),

    /// No envelope exists for this id.
    #[error("LF_ERR_201: Envelope not found: {0}")]
    NotFound(EnvelopeId),

    /// This identity has already claimed from the envelope.
    #[error("LF_ERR_202: Already claimed: {claimant} on {id}")]
    AlreadyClaimed { id: EnvelopeId, claimant: Identity },

    /// Every claim slot has been used.
    #[error("LF_ERR_203: Max claims reached: {id} allows {max_claims}")]
    MaxClaimsReached { id: EnvelopeId, max_claims: u64 },

    /// Only the owner may delete an envelope.
    #[error("LF_ERR_204: Unauthorized: {caller} is not the owner of {id}")]
    Unauthorized { id: EnvelopeId, caller: Identity },

    /// The claim window has closed.
    #[error("LF_ERR_205: Time limit expired: {id} expired at {expired_at}")]
    Expired {
        id: EnvelopeId,
        expired_at: DateTime<Utc>,
    },

    // =================================================================
    // Funds / Vault Errors (3xx)
    // =================================================================
    /// A transfer would exceed the available balance.
    #[error("LF_ERR_300: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// A credit would overflow the destination balance.
    #[error("LF_ERR_301: Balance overflow")]
    BalanceOverflow,

    /// A token vault cannot be released while it still holds tokens.
    #[error("LF_ERR_302: Vault not empty: {balance} remaining")]
    VaultNotEmpty { balance: u64 },

    /// The signer presented to a token vault is not its authority.
    #[error("LF_ERR_303: Vault authority mismatch")]
    VaultAuthorityMismatch,

    /// The asset of a transfer does not match the vault's asset.
    #[error("LF_ERR_304: Asset mismatch: expected {expected}, got {actual}")]
    AssetMismatch { expected: String, actual: String },

    /// Value was created or destroyed: a bookkeeping bug.
    #[error("LF_ERR_305: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("LF_ERR_900: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("LF_ERR_901: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LifafaError>;

impl From<serde_json::Error> for LifafaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
