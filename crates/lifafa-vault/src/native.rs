//! Native-coin vault: the envelope account's own balance.
//!
//! The account holds its rent reserve plus whatever is escrowed. Only the
//! part above the reserve can be paid out; closing the account releases
//! everything, reserve included, to the refund target.

use lifafa_types::{Asset, EnvelopeAddress, Identity, LifafaError, Result};

use crate::{Ledger, Vault};

/// Native balance held directly by an envelope record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeVault {
    /// The envelope account this balance belongs to.
    address: EnvelopeAddress,
    /// Physical balance: `rent_reserve + escrowed`.
    lamports: u64,
    rent_reserve: u64,
}

impl NativeVault {
    /// Allocate the account, charging `payer` its rent reserve.
    ///
    /// # Errors
    /// `InsufficientFunds` if `payer` cannot cover the reserve.
    pub fn open(
        ledger: &Ledger,
        payer: Identity,
        address: EnvelopeAddress,
        rent_reserve: u64,
    ) -> Result<Self> {
        ledger.debit(payer, Asset::Native, rent_reserve)?;
        Ok(Self {
            address,
            lamports: rent_reserve,
            rent_reserve,
        })
    }

    #[must_use]
    pub fn address(&self) -> &EnvelopeAddress {
        &self.address
    }

    fn authorize(&self, authority: &EnvelopeAddress) -> Result<()> {
        if *authority != self.address {
            return Err(LifafaError::VaultAuthorityMismatch);
        }
        Ok(())
    }
}

impl Vault for NativeVault {
    fn asset(&self) -> &Asset {
        &Asset::Native
    }

    fn balance(&self) -> u64 {
        self.lamports
    }

    fn withdrawable(&self) -> u64 {
        self.lamports.saturating_sub(self.rent_reserve)
    }

    fn reserve(&self) -> u64 {
        self.rent_reserve
    }

    fn held(&self, asset: &Asset) -> u64 {
        if asset.is_native() { self.lamports } else { 0 }
    }

    fn deposit(&mut self, ledger: &Ledger, from: Identity, amount: u64) -> Result<()> {
        let updated = self
            .lamports
            .checked_add(amount)
            .ok_or(LifafaError::BalanceOverflow)?;
        ledger.debit(from, Asset::Native, amount)?;
        self.lamports = updated;
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
        let available = self.withdrawable();
        if amount > available {
            return Err(LifafaError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        ledger.credit(to, Asset::Native, amount)?;
        self.lamports -= amount;
        Ok(())
    }

    fn close(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        refund_to: Identity,
    ) -> Result<u64> {
        self.authorize(authority)?;
        let refunded = self.lamports;
        ledger.credit(refund_to, Asset::Native, refunded)?;
        self.lamports = 0;
        self.rent_reserve = 0;
        Ok(refunded)
    }
}
