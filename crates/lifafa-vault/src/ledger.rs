//! Wallet balances: the counterparty of every vault transfer.
//!
//! Tracks per-(identity, asset) balances. Each mutation is atomic per
//! wallet entry: either the full debit/credit applies or the balance is
//! unchanged. Safe to share across threads.

use dashmap::DashMap;
use lifafa_types::{Asset, Identity, LifafaError, Result};
use parking_lot::Mutex;

use crate::supply_conservation::SupplyConservation;

/// Source of truth for every balance outside an envelope vault.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Per-(identity, asset) balances.
    balances: DashMap<(Identity, Asset), u64>,
    /// Issued supply per asset.
    supply: Mutex<SupplyConservation>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue new supply into a wallet (airdrop / mint).
    ///
    /// # Errors
    /// `BalanceOverflow` if the wallet cannot hold it.
    pub fn fund(&self, identity: Identity, asset: Asset, amount: u64) -> Result<()> {
        self.credit(identity, asset, amount)?;
        self.supply.lock().record_issued(asset, amount);
        tracing::debug!(wallet = %identity, asset = %asset, amount, "Supply issued");
        Ok(())
    }

    /// Add to a wallet.
    ///
    /// # Errors
    /// `BalanceOverflow` if the balance would exceed `u64::MAX`.
    pub fn credit(&self, identity: Identity, asset: Asset, amount: u64) -> Result<()> {
        let mut entry = self.balances.entry((identity, asset)).or_insert(0);
        let updated = entry
            .checked_add(amount)
            .ok_or(LifafaError::BalanceOverflow)?;
        *entry = updated;
        Ok(())
    }

    /// Check that a wallet can absorb `amount` without moving anything.
    ///
    /// # Errors
    /// `BalanceOverflow` if crediting `amount` would overflow.
    pub fn ensure_credit(&self, identity: Identity, asset: Asset, amount: u64) -> Result<()> {
        self.balance(identity, asset)
            .checked_add(amount)
            .map(|_| ())
            .ok_or(LifafaError::BalanceOverflow)
    }

    /// Take from a wallet.
    ///
    /// # Errors
    /// `InsufficientFunds` if the wallet holds less than `amount`.
    pub fn debit(&self, identity: Identity, asset: Asset, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let mut entry =
            self.balances
                .get_mut(&(identity, asset))
                .ok_or(LifafaError::InsufficientFunds {
                    needed: amount,
                    available: 0,
                })?;

        if *entry < amount {
            return Err(LifafaError::InsufficientFunds {
                needed: amount,
                available: *entry,
            });
        }

        *entry -= amount;
        Ok(())
    }

    /// Current balance of a wallet.
    #[must_use]
    pub fn balance(&self, identity: Identity, asset: Asset) -> u64 {
        self.balances
            .get(&(identity, asset))
            .map_or(0, |entry| *entry)
    }

    /// Sum of every wallet's balance of an asset.
    #[must_use]
    pub fn total_supply(&self, asset: Asset) -> u128 {
        self.balances
            .iter()
            .filter(|entry| entry.key().1 == asset)
            .map(|entry| u128::from(*entry.value()))
            .sum()
    }

    /// Everything ever issued of an asset.
    #[must_use]
    pub fn expected_supply(&self, asset: Asset) -> u128 {
        self.supply.lock().expected_supply(&asset)
    }

    /// Check `wallets + escrowed == issued`.
    ///
    /// # Errors
    /// `ConservationViolation` if value was created or destroyed.
    pub fn verify_supply(&self, asset: Asset, escrowed: u128) -> Result<()> {
        let actual = self.total_supply(asset) + escrowed;
        self.supply.lock().verify(&asset, actual)
    }
}
