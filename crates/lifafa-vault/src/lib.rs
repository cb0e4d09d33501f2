//! # lifafa-vault
//!
//! **Value plane**: where escrowed value physically lives.
//!
//! ## Architecture
//!
//! 1. **Ledger**: wallet balances per (identity, asset), the counterparty of
//!    every vault transfer
//! 2. **SupplyConservation**: issued supply per asset, checked against
//!    wallets + vaults
//! 3. **Vault**: capability trait with two implementations
//!    - **NativeVault**: native coin held by the envelope account itself,
//!      on top of its rent reserve
//!    - **TokenVault**: a token account whose authority is the envelope
//! 4. **EnvelopeVault**: the tagged variant the registry stores
//!
//! ## Transfer Flow
//!
//! ```text
//! create: Ledger.debit(owner) → Vault.deposit
//! claim:  Vault.withdraw → Ledger.credit(claimant)
//! delete: Vault.withdraw(all) → Vault.close → Ledger.credit(owner)
//! ```
//!
//! Every transfer either fully applies or leaves both sides untouched.
//! An overdraw is always an error, never clamped.

pub mod ledger;
pub mod native;
pub mod supply_conservation;
pub mod token;
pub mod vault;

pub use ledger::Ledger;
pub use native::NativeVault;
pub use supply_conservation::SupplyConservation;
pub use token::TokenVault;
pub use vault::{EnvelopeVault, Vault};
