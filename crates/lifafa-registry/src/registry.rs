//! # Envelope registry
//!
//! Owns every live envelope and its vault, keyed by derived address.
//!
//! ## Locking
//!
//! Each record sits in its own `Mutex<Option<Slot>>`. All work on one id
//! happens under that mutex; different ids only meet on the map shard,
//! which is held briefly. Lock order is always shard, then slot. `delete`
//! empties the slot under its mutex and removes the map entry only after
//! releasing it, so a slot observed as `None` is a tombstone and reads as
//! `NotFound`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lifafa_types::{
    Asset, ClaimMode, ClaimReceipt, CreateEnvelope, Envelope, EnvelopeAddress,
    EnvelopeId, Identity, LifafaError, Reclaim, RegistryConfig, Result,
};
use lifafa_vault::{EnvelopeVault, Ledger, Vault};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::split;

/// A live record and the vault backing it.
#[derive(Debug)]
struct Slot {
    envelope: Envelope,
    vault: EnvelopeVault,
}

impl Slot {
    /// The record and its vault must hold the same asset.
    fn check_backing(&self) -> Result<()> {
        if self.vault.asset() != &self.envelope.asset {
            return Err(LifafaError::AssetMismatch {
                expected: self.envelope.asset.to_string(),
                actual: self.vault.asset().to_string(),
            });
        }
        Ok(())
    }
}

type SlotCell = Arc<Mutex<Option<Slot>>>;

/// Registry of envelopes: create, claim once per identity, owner reclaim.
pub struct EnvelopeRegistry {
    config: RegistryConfig,
    ledger: Arc<Ledger>,
    slots: DashMap<EnvelopeAddress, SlotCell>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl std::fmt::Debug for EnvelopeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeRegistry")
            .field("config", &self.config)
            .field("envelopes", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl EnvelopeRegistry {
    /// Build a registry over `ledger`, drawing random payouts from OS
    /// entropy.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(config: RegistryConfig, ledger: Arc<Ledger>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ledger,
            slots: DashMap::new(),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        })
    }

    /// Replace the random source used for `Random` mode payouts.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Address an envelope with this id has (or would have) here.
    #[must_use]
    pub fn address_of(&self, id: EnvelopeId) -> EnvelopeAddress {
        EnvelopeAddress::derive(&self.config.namespace, id)
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Open a new envelope funded by `owner`.
    ///
    /// Validation runs before any funds move. Rent and deposit are charged
    /// together: if the deposit fails the rent is refunded and nothing is
    /// stored.
    ///
    /// # Errors
    /// Any validation error from [`CreateEnvelope::validate`],
    /// `AlreadyExists` for a live id, or `InsufficientFunds`.
    pub fn create(
        &self,
        owner: Identity,
        request: CreateEnvelope,
        now: DateTime<Utc>,
    ) -> Result<EnvelopeAddress> {
        let mode = request.validate(&self.config, now)?;
        let id = request.id;
        let address = self.address_of(id);

        match self.slots.entry(address) {
            Entry::Occupied(mut entry) => {
                if entry.get().lock().is_some() {
                    return Err(LifafaError::AlreadyExists(id));
                }
                // Fresh cell: a pending delete only removes the cell it emptied.
                let slot = self.open_slot(owner, request, mode, address, now)?;
                entry.insert(Arc::new(Mutex::new(Some(slot))));
            }
            Entry::Vacant(entry) => {
                let slot = self.open_slot(owner, request, mode, address, now)?;
                entry.insert(Arc::new(Mutex::new(Some(slot))));
            }
        }

        tracing::info!(
            envelope = %id,
            address = %address,
            owner = %owner,
            mode = %mode,
            "Envelope created"
        );
        Ok(address)
    }

    fn open_slot(
        &self,
        owner: Identity,
        request: CreateEnvelope,
        mode: ClaimMode,
        address: EnvelopeAddress,
        now: DateTime<Utc>,
    ) -> Result<Slot> {
        let mut vault =
            EnvelopeVault::open(&self.ledger, owner, address, request.asset, &self.config)?;
        if let Err(err) = vault.deposit(&self.ledger, owner, request.amount) {
            vault.close(&self.ledger, &address, owner)?;
            return Err(err);
        }

        tracing::debug!(
            address = %address,
            asset = %request.asset,
            amount = request.amount,
            max_claims = request.max_claims,
            rent = vault.reserve(),
            "Vault funded"
        );

        Ok(Slot {
            envelope: Envelope::open(request, mode, owner, address, now),
            vault,
        })
    }

    // -----------------------------------------------------------------------
    // Claim
    // -----------------------------------------------------------------------

    /// Pay `claimant` one share of envelope `id`.
    ///
    /// # Errors
    /// `NotFound`, `AlreadyClaimed`, `MaxClaimsReached`, `Expired` (when
    /// expiry is enforced), or `InsufficientFunds` on a bookkeeping fault.
    pub fn claim(
        &self,
        id: EnvelopeId,
        claimant: Identity,
        now: DateTime<Utc>,
    ) -> Result<ClaimReceipt> {
        let address = self.address_of(id);
        let cell = self.cell(&address).ok_or(LifafaError::NotFound(id))?;
        let mut guard = cell.lock();
        let slot = guard.as_mut().ok_or(LifafaError::NotFound(id))?;

        slot.envelope.check_claim(&claimant, now, self.config.expiry)?;
        slot.check_backing()?;
        let payout = split::payout(&slot.envelope, &self.rng);
        slot.envelope.ensure_payable(payout)?;

        slot.vault.withdraw(&self.ledger, &address, claimant, payout)?;
        slot.envelope.apply_claim(claimant, payout, now)?;

        let envelope = &slot.envelope;
        tracing::debug!(
            envelope = %id,
            claimant = %claimant,
            payout,
            claims = envelope.claims,
            remaining = envelope.remaining,
            "Envelope claimed"
        );

        Ok(ClaimReceipt {
            id,
            claimant,
            payout,
            claims: envelope.claims,
            remaining: envelope.remaining,
            claimed_at: now,
        })
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Close envelope `id`, returning everything it still holds to its
    /// owner. Allowed at any time regardless of claims or expiry.
    ///
    /// # Errors
    /// `NotFound`, `Unauthorized` if `caller` is not the owner, or
    /// `BalanceOverflow` if the owner's wallet cannot take the refund, in
    /// which case nothing changes.
    pub fn delete(&self, id: EnvelopeId, caller: Identity) -> Result<Reclaim> {
        let address = self.address_of(id);
        let cell = self.cell(&address).ok_or(LifafaError::NotFound(id))?;

        let reclaim = {
            let mut guard = cell.lock();
            let slot = guard.as_mut().ok_or(LifafaError::NotFound(id))?;
            if slot.envelope.owner != caller {
                return Err(LifafaError::Unauthorized { id, caller });
            }
            slot.check_backing()?;

            if slot.vault.withdrawable() != slot.envelope.remaining {
                tracing::warn!(
                    envelope = %id,
                    vault = slot.vault.withdrawable(),
                    record = slot.envelope.remaining,
                    "Vault balance disagrees with record; draining vault"
                );
            }
            let (returned, rent_refunded) = slot.vault.release(&self.ledger, &address, caller)?;

            let reclaim = Reclaim {
                id,
                owner: caller,
                asset: slot.envelope.asset,
                returned,
                rent_refunded,
            };
            *guard = None;
            reclaim
        };

        self.slots
            .remove_if(&address, |_, current| Arc::ptr_eq(current, &cell));

        tracing::info!(
            envelope = %id,
            owner = %caller,
            asset = %reclaim.asset,
            returned = reclaim.returned,
            rent_refunded = reclaim.rent_refunded,
            "Envelope deleted"
        );
        Ok(reclaim)
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Snapshot of the record, if live.
    #[must_use]
    pub fn fetch(&self, id: EnvelopeId) -> Option<Envelope> {
        let cell = self.cell(&self.address_of(id))?;
        let guard = cell.lock();
        guard.as_ref().map(|slot| slot.envelope.clone())
    }

    /// Physical balance of the envelope's vault (rent included for native).
    ///
    /// # Errors
    /// `NotFound` if no live envelope has this id.
    pub fn fetch_balance(&self, id: EnvelopeId) -> Result<u64> {
        let cell = self
            .cell(&self.address_of(id))
            .ok_or(LifafaError::NotFound(id))?;
        let guard = cell.lock();
        guard
            .as_ref()
            .map(|slot| slot.vault.balance())
            .ok_or(LifafaError::NotFound(id))
    }

    /// Number of live envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells()
            .iter()
            .filter(|cell| cell.lock().is_some())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total physical holdings of `asset` across every vault.
    #[must_use]
    pub fn escrowed(&self, asset: Asset) -> u128 {
        self.cells()
            .iter()
            .filter_map(|cell| cell.lock().as_ref().map(|slot| slot.vault.held(&asset)))
            .map(u128::from)
            .sum()
    }

    /// Check every record's own books, then `wallets + vaults == issued`
    /// for `asset`. Only meaningful while no operation is in flight.
    ///
    /// # Errors
    /// `ConservationViolation` naming the first broken check.
    pub fn verify_conservation(&self, asset: Asset) -> Result<()> {
        let mut escrowed = 0u128;
        for cell in self.cells() {
            let guard = cell.lock();
            if let Some(slot) = guard.as_ref() {
                slot.envelope.check_conservation()?;
                escrowed += u128::from(slot.vault.held(&asset));
            }
        }
        self.ledger.verify_supply(asset, escrowed)
    }

    fn cell(&self, address: &EnvelopeAddress) -> Option<SlotCell> {
        self.slots.get(address).map(|entry| Arc::clone(entry.value()))
    }

    // Clone out first so no shard lock is held while slots are locked.
    fn cells(&self) -> Vec<SlotCell> {
        self.slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}
