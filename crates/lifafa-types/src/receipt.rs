//! Results handed back to callers of `claim` and `delete`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Asset, EnvelopeId, Identity};

/// Proof of one successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub id: EnvelopeId,
    pub claimant: Identity,
    /// Amount transferred to the claimant.
    pub payout: u64,
    /// Claim count after this claim.
    pub claims: u64,
    /// Escrowed value left after this claim.
    pub remaining: u64,
    pub claimed_at: DateTime<Utc>,
}

/// What the owner got back when an envelope was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reclaim {
    pub id: EnvelopeId,
    pub owner: Identity,
    pub asset: Asset,
    /// Escrowed value returned, in `asset` units.
    pub returned: u64,
    /// Native rent reserve released with the vault.
    pub rent_refunded: u64,
}
