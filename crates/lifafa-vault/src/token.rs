//! Token vault: a dedicated token account owned by the envelope.
//!
//! The account's transfer authority is the envelope address. Its native
//! rent reserve is held alongside and only released by `close`, which
//! refuses to run while any tokens remain. Callers drain first, then close.

use lifafa_types::{Asset, EnvelopeAddress, Identity, LifafaError, MintId, Result, VaultAddress};

use crate::{Ledger, Vault};

/// Token account scoped to one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenVault {
    address: VaultAddress,
    authority: EnvelopeAddress,
    asset: Asset,
    /// Token balance.
    amount: u64,
    /// Native reserve backing the record and token accounts.
    rent_lamports: u64,
}

impl TokenVault {
    /// Create the token account for `authority`, charging `payer` the
    /// native rent reserve.
    ///
    /// # Errors
    /// `InsufficientFunds` if `payer` cannot cover the reserve.
    pub fn open(
        ledger: &Ledger,
        payer: Identity,
        authority: EnvelopeAddress,
        mint: MintId,
        rent_lamports: u64,
    ) -> Result<Self> {
        ledger.debit(payer, Asset::Native, rent_lamports)?;
        Ok(Self {
            address: VaultAddress::derive(&authority),
            authority,
            asset: Asset::Token(mint),
            amount: 0,
            rent_lamports,
        })
    }

    #[must_use]
    pub fn address(&self) -> &VaultAddress {
        &self.address
    }

    #[must_use]
    pub fn authority(&self) -> &EnvelopeAddress {
        &self.authority
    }

    fn authorize(&self, authority: &EnvelopeAddress) -> Result<()> {
        if *authority != self.authority {
            return Err(LifafaError::VaultAuthorityMismatch);
        }
        Ok(())
    }
}

impl Vault for TokenVault {
    fn asset(&self) -> &Asset {
        &self.asset
    }

    fn balance(&self) -> u64 {
        self.amount
    }

    fn withdrawable(&self) -> u64 {
        self.amount
    }

    fn reserve(&self) -> u64 {
        self.rent_lamports
    }

    fn held(&self, asset: &Asset) -> u64 {
        if *asset == self.asset {
            self.amount
        } else if asset.is_native() {
            self.rent_lamports
        } else {
            0
        }
    }

    fn deposit(&mut self, ledger: &Ledger, from: Identity, amount: u64) -> Result<()> {
        let updated = self
            .amount
            .checked_add(amount)
            .ok_or(LifafaError::BalanceOverflow)?;
        ledger.debit(from, self.asset, amount)?;
        self.amount = updated;
        Ok(())
    }

    fn withdraw(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        to: Identity,
        amount: u64,
    ) -> Result<()> {
        self.authorize(authority)?;
        if amount > self.amount {
            return Err(LifafaError::InsufficientFunds {
                needed: amount,
                available: self.amount,
            });
        }
        ledger.credit(to, self.asset, amount)?;
        self.amount -= amount;
        Ok(())
    }

    fn close(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        refund_to: Identity,
    ) -> Result<u64> {
        self.authorize(authority)?;
        if self.amount != 0 {
            tracing::warn!(
                vault = %self.address,
                balance = self.amount,
                "Refusing to close token vault with balance"
            );
            return Err(LifafaError::VaultNotEmpty {
                balance: self.amount,
            });
        }
        let refunded = self.rent_lamports;
        ledger.credit(refund_to, Asset::Native, refunded)?;
        self.rent_lamports = 0;
        Ok(refunded)
    }
}
