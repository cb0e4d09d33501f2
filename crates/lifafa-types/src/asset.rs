//! Asset descriptor for the Lifafa escrow model.
//!
//! An envelope holds exactly one asset for its whole life: either the native
//! coin (held directly by the envelope account) or a fungible token (held by
//! a token account the envelope controls).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MintId;

/// What an envelope escrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// The ledger's native coin, in base units.
    Native,
    /// A fungible token identified by its mint.
    Token(MintId),
}

impl Asset {
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Token(mint) => write!(f, "TOKEN({mint})"),
        }
    }
}
