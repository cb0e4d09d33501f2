//! The vault capability and the tagged variant the registry stores.

use lifafa_types::{Asset, EnvelopeAddress, Identity, LifafaError, RegistryConfig, Result};

use crate::{Ledger, NativeVault, TokenVault};

/// A physical value store backing one envelope.
///
/// Transfers are authorized by the envelope's address: only the envelope
/// that owns a vault can move value out of it.
pub trait Vault {
    /// The asset this vault escrows.
    fn asset(&self) -> &Asset;

    /// Physical balance in `asset` units, reserve included for native.
    fn balance(&self) -> u64;

    /// What can be paid out, in `asset` units.
    fn withdrawable(&self) -> u64;

    /// Native rent reserve released on close.
    fn reserve(&self) -> u64;

    /// Physical holdings of `asset`, for conservation checks.
    fn held(&self, asset: &Asset) -> u64;

    /// Move `amount` from `from`'s wallet into the vault.
    ///
    /// # Errors
    /// `InsufficientFunds` if the wallet is short, `BalanceOverflow` if the
    /// vault cannot hold it.
    fn deposit(&mut self, ledger: &Ledger, from: Identity, amount: u64) -> Result<()>;

    /// Move `amount` out of the vault into `to`'s wallet.
    ///
    /// # Errors
    /// `VaultAuthorityMismatch` for a foreign signer, `InsufficientFunds` if
    /// `amount > withdrawable()`.
    fn withdraw(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        to: Identity,
        amount: u64,
    ) -> Result<()>;

    /// Release the vault and send what it still holds to `refund_to`.
    /// Returns the native amount refunded.
    ///
    /// # Errors
    /// `VaultAuthorityMismatch`, or `VaultNotEmpty` for an undrained token
    /// vault.
    fn close(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        refund_to: Identity,
    ) -> Result<u64>;
}

/// Native or token vault, chosen by the envelope's asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeVault {
    Native(NativeVault),
    Token(TokenVault),
}

impl EnvelopeVault {
    /// Allocate the vault for `authority`, charging `payer` the rent
    /// reserve that `config` prescribes for this asset kind.
    ///
    /// # Errors
    /// `InsufficientFunds` if `payer` cannot cover the reserve.
    pub fn open(
        ledger: &Ledger,
        payer: Identity,
        authority: EnvelopeAddress,
        asset: Asset,
        config: &RegistryConfig,
    ) -> Result<Self> {
        let rent = config.rent_for(&asset);
        match asset {
            Asset::Native => Ok(Self::Native(NativeVault::open(ledger, payer, authority, rent)?)),
            Asset::Token(mint) => Ok(Self::Token(TokenVault::open(
                ledger, payer, authority, mint, rent,
            )?)),
        }
    }

    /// Drain everything withdrawable to `owner` and close. Returns
    /// `(returned, rent_refunded)`.
    ///
    /// Every credit is checked against `owner`'s wallets first, so the
    /// vault is either fully released or left untouched.
    ///
    /// # Errors
    /// `VaultAuthorityMismatch`, or `BalanceOverflow` if `owner` cannot
    /// absorb the refund.
    pub fn release(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        owner: Identity,
    ) -> Result<(u64, u64)> {
        let returned = self.withdrawable();
        let rent = self.reserve();
        let asset = *self.asset();
        if asset.is_native() {
            let total = returned
                .checked_add(rent)
                .ok_or(LifafaError::BalanceOverflow)?;
            ledger.ensure_credit(owner, Asset::Native, total)?;
        } else {
            ledger.ensure_credit(owner, asset, returned)?;
            ledger.ensure_credit(owner, Asset::Native, rent)?;
        }

        self.withdraw(ledger, authority, owner, returned)?;
        let rent_refunded = self.close(ledger, authority, owner)?;
        Ok((returned, rent_refunded))
    }

    fn inner(&self) -> &dyn Vault {
        match self {
            Self::Native(v) => v,
            Self::Token(v) => v,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Vault {
        match self {
            Self::Native(v) => v,
            Self::Token(v) => v,
        }
    }
}

impl Vault for EnvelopeVault {
    fn asset(&self) -> &Asset {
        self.inner().asset()
    }

    fn balance(&self) -> u64 {
        self.inner().balance()
    }

    fn withdrawable(&self) -> u64 {
        self.inner().withdrawable()
    }

    fn reserve(&self) -> u64 {
        self.inner().reserve()
    }

    fn held(&self, asset: &Asset) -> u64 {
        self.inner().held(asset)
    }

    fn deposit(&mut self, ledger: &Ledger, from: Identity, amount: u64) -> Result<()> {
        self.inner_mut().deposit(ledger, from, amount)
    }

    fn withdraw(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        to: Identity,
        amount: u64,
    ) -> Result<()> {
        self.inner_mut().withdraw(ledger, authority, to, amount)
    }

    fn close(
        &mut self,
        ledger: &Ledger,
        authority: &EnvelopeAddress,
        refund_to: Identity,
    ) -> Result<u64> {
        self.inner_mut().close(ledger, authority, refund_to)
    }
}
