//! # Envelope: the unit of escrow
//!
//! An `Envelope` covers one deposit and its claim policy. Any number of
//! identities may claim from it, each exactly once, until `max_claims`
//! shares have been paid out. The owner may reclaim whatever is left at
//! any time.
//!
//! ## Lifecycle
//!
//! ```text
//!   ┌────────┐  create   ┌────────┐  delete   ┌────────┐
//!   │ ABSENT ├──────────▶│ ACTIVE ├──────────▶│ ABSENT │
//!   └────────┘           └─┬────▲─┘           └────────┘
//!                          │    │ claim (1..=max_claims)
//!                          └────┘
//! ```
//!
//! `ACTIVE` has no terminal sub-state: once `claims == max_claims` further
//! claims fail, but the record lives until the owner deletes it.
//!
//! ## Invariants
//!
//! - `claims <= max_claims`
//! - each identity appears at most once in `claimants`
//! - `sum(claimants.amount) + remaining == amount`
//! - `asset` never changes

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Asset, EnvelopeAddress, EnvelopeId, ExpiryPolicy, Identity, LifafaError, RegistryConfig,
    Result, constants,
};

/// How each claim's payout is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimMode {
    /// Pseudo-random share of what remains; the last claim drains exactly.
    Random,
    /// `floor(amount / max_claims)` for every claimant.
    Equal,
}

impl ClaimMode {
    /// Wire code of this mode.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Random => constants::CLAIM_MODE_RANDOM,
            Self::Equal => constants::CLAIM_MODE_EQUAL,
        }
    }
}

impl TryFrom<u8> for ClaimMode {
    type Error = LifafaError;

    /// The `None` sentinel (`0`) exists in the input domain only to be
    /// rejected here.
    fn try_from(code: u8) -> Result<Self> {
        match code {
            constants::CLAIM_MODE_RANDOM => Ok(Self::Random),
            constants::CLAIM_MODE_EQUAL => Ok(Self::Equal),
            other => Err(LifafaError::InvalidClaimMode(other)),
        }
    }
}

impl std::fmt::Display for ClaimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "RANDOM"),
            Self::Equal => write!(f, "EQUAL"),
        }
    }
}

/// What one claimant received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub amount: u64,
    pub claimed_at: DateTime<Utc>,
}

/// Request to open a new envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEnvelope {
    pub id: EnvelopeId,
    /// Deposit in base units of `asset`.
    pub amount: u64,
    pub time_limit_secs: i64,
    pub max_claims: u64,
    pub owner_name: String,
    pub description: String,
    /// Raw claim mode code; see [`ClaimMode::try_from`].
    pub claim_mode: u8,
    pub asset: Asset,
}

impl CreateEnvelope {
    /// A native envelope with a one-day window and empty display strings.
    #[must_use]
    pub fn new(id: u64, amount: u64, max_claims: u64, claim_mode: u8) -> Self {
        Self {
            id: EnvelopeId(id),
            amount,
            time_limit_secs: 86_400,
            max_claims,
            owner_name: String::new(),
            description: String::new(),
            claim_mode,
            asset: Asset::Native,
        }
    }

    #[must_use]
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = asset;
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, secs: i64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    #[must_use]
    pub fn with_names(mut self, owner_name: impl Into<String>, description: impl Into<String>) -> Self {
        self.owner_name = owner_name.into();
        self.description = description.into();
        self
    }

    /// Check every creation precondition that does not depend on storage.
    ///
    /// # Errors
    /// The first violated rule, in this order: claim mode, amount,
    /// max claims, amount vs. max claims (Random only), time limit, owner
    /// name, description.
    pub fn validate(&self, config: &RegistryConfig, now: DateTime<Utc>) -> Result<ClaimMode> {
        let mode = ClaimMode::try_from(self.claim_mode)?;

        if self.amount == 0 {
            return Err(LifafaError::InvalidAmount {
                reason: "amount must be greater than zero".to_string(),
            });
        }
        if self.max_claims == 0 {
            return Err(LifafaError::InvalidMaxClaims);
        }
        if self.max_claims > config.max_claims_allowed {
            return Err(LifafaError::MaxClaimsLimitExceeded {
                requested: self.max_claims,
                limit: config.max_claims_allowed,
            });
        }
        // Random shares are at least one unit each; Equal shares may floor to 0.
        if mode == ClaimMode::Random && self.amount < self.max_claims {
            return Err(LifafaError::InvalidAmount {
                reason: format!(
                    "amount {} cannot give {} claimants a nonzero share",
                    self.amount, self.max_claims
                ),
            });
        }

        let window = (self.time_limit_secs >= 0)
            .then(|| TimeDelta::try_seconds(self.time_limit_secs))
            .flatten()
            .ok_or(LifafaError::InvalidTimeLimit(self.time_limit_secs))?;
        if now.checked_add_signed(window).is_none() {
            return Err(LifafaError::InvalidTimeLimit(self.time_limit_secs));
        }

        if self.owner_name.len() > config.max_owner_name_len {
            return Err(LifafaError::OwnerNameTooLong {
                len: self.owner_name.len(),
                max: config.max_owner_name_len,
            });
        }
        if self.description.len() > config.max_description_len {
            return Err(LifafaError::DescriptionTooLong {
                len: self.description.len(),
                max: config.max_description_len,
            });
        }

        Ok(mode)
    }
}

/// One escrow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: EnvelopeId,
    pub address: EnvelopeAddress,
    pub owner: Identity,
    pub owner_name: String,
    pub description: String,
    pub creation_time: DateTime<Utc>,
    pub time_limit_secs: i64,
    pub claim_mode: ClaimMode,
    pub max_claims: u64,
    /// Successful claims so far.
    pub claims: u64,
    pub asset: Asset,
    /// Originally deposited amount.
    pub amount: u64,
    /// Still claimable. Authoritative, independent of the vault's
    /// physical balance.
    pub remaining: u64,
    pub claimants: BTreeMap<Identity, ClaimRecord>,
}

impl Envelope {
    /// Build a fresh record from a validated request.
    #[must_use]
    pub fn open(
        request: CreateEnvelope,
        claim_mode: ClaimMode,
        owner: Identity,
        address: EnvelopeAddress,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: request.id,
            address,
            owner,
            owner_name: request.owner_name,
            description: request.description,
            creation_time: now,
            time_limit_secs: request.time_limit_secs,
            claim_mode,
            max_claims: request.max_claims,
            claims: 0,
            asset: request.asset,
            amount: request.amount,
            remaining: request.amount,
            claimants: BTreeMap::new(),
        }
    }

    /// End of the claim window.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        TimeDelta::try_seconds(self.time_limit_secs)
            .and_then(|window| self.creation_time.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    #[must_use]
    pub fn has_claimed(&self, claimant: &Identity) -> bool {
        self.claimants.contains_key(claimant)
    }

    /// Every claim slot has been used.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.claims >= self.max_claims
    }

    /// Sum of all payouts issued so far.
    #[must_use]
    pub fn total_paid(&self) -> u128 {
        self.claimants.values().map(|c| u128::from(c.amount)).sum()
    }

    /// Claim preconditions, checked in order: not yet claimed, ceiling,
    /// then expiry (only when the policy enforces it).
    ///
    /// # Errors
    /// `AlreadyClaimed`, `MaxClaimsReached` or `Expired`.
    pub fn check_claim(
        &self,
        claimant: &Identity,
        now: DateTime<Utc>,
        expiry: ExpiryPolicy,
    ) -> Result<()> {
        if self.has_claimed(claimant) {
            return Err(LifafaError::AlreadyClaimed {
                id: self.id,
                claimant: *claimant,
            });
        }
        if self.is_full() {
            return Err(LifafaError::MaxClaimsReached {
                id: self.id,
                max_claims: self.max_claims,
            });
        }
        if expiry == ExpiryPolicy::Enforced && self.is_expired(now) {
            return Err(LifafaError::Expired {
                id: self.id,
                expired_at: self.expires_at(),
            });
        }
        Ok(())
    }

    /// `payout` must fit in `remaining`. A failure here is a bookkeeping
    /// bug and aborts the claim; it is never clamped.
    ///
    /// # Errors
    /// `InsufficientFunds` when `payout > remaining`.
    pub fn ensure_payable(&self, payout: u64) -> Result<()> {
        if payout > self.remaining {
            return Err(LifafaError::InsufficientFunds {
                needed: payout,
                available: self.remaining,
            });
        }
        Ok(())
    }

    /// Commit a claim. All checks run before any field changes.
    ///
    /// # Errors
    /// `AlreadyClaimed`, `MaxClaimsReached` or `InsufficientFunds`.
    pub fn apply_claim(
        &mut self,
        claimant: Identity,
        payout: u64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.check_claim(&claimant, now, ExpiryPolicy::Informational)?;
        self.ensure_payable(payout)?;

        self.remaining -= payout;
        self.claims += 1;
        self.claimants.insert(
            claimant,
            ClaimRecord {
                amount: payout,
                claimed_at: now,
            },
        );
        Ok(())
    }

    /// `sum(payouts) + remaining == amount`.
    ///
    /// # Errors
    /// `ConservationViolation` if value was created or destroyed.
    pub fn check_conservation(&self) -> Result<()> {
        let accounted = self.total_paid() + u128::from(self.remaining);
        if accounted != u128::from(self.amount) {
            return Err(LifafaError::ConservationViolation {
                reason: format!(
                    "{}: paid {} + remaining {} != deposited {}",
                    self.id,
                    self.total_paid(),
                    self.remaining,
                    self.amount
                ),
            });
        }
        Ok(())
    }
}
