//! Supply conservation invariant checker.
//!
//! Invariant enforced after every registry operation:
//! ```text
//! ∀ asset: Σ(wallets) + Σ(vault holdings) == Σ(issued)
//! ```
//!
//! Envelopes only move value between wallets and vaults. If this ever breaks,
//! value was created or destroyed by a bookkeeping bug.

use std::collections::HashMap;

use lifafa_types::{Asset, LifafaError, Result};

/// Tracks per-asset issued supply and validates conservation.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    /// Total issued per asset since genesis.
    issued: HashMap<Asset, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record newly issued supply.
    pub fn record_issued(&mut self, asset: Asset, amount: u64) {
        *self.issued.entry(asset).or_insert(0) += u128::from(amount);
    }

    /// Expected total supply for an asset.
    #[must_use]
    pub fn expected_supply(&self, asset: &Asset) -> u128 {
        self.issued.get(asset).copied().unwrap_or(0)
    }

    /// Verify that the actual supply (wallets + vaults) matches what was
    /// issued for a given asset.
    ///
    /// # Errors
    /// Returns [`LifafaError::ConservationViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: &Asset, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(LifafaError::ConservationViolation {
                reason: format!("{asset}: actual supply {actual_supply} != issued {expected}"),
            });
        }
        Ok(())
    }
}
