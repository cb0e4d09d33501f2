//! Identifiers used throughout Lifafa.
//!
//! Envelope ids are caller-supplied `u64`s. Participants, mints and storage
//! locations are 32-byte keys, serialized as lowercase hex so they can key
//! JSON maps.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants;

/// Serde adapter: `[u8; 32]` as a lowercase hex string.
mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let bytes = hex::decode(&text).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|b: Vec<u8>| de::Error::invalid_length(b.len(), &"32 bytes"))
    }
}

// ---------------------------------------------------------------------------
// EnvelopeId
// ---------------------------------------------------------------------------

/// Caller-supplied envelope identifier. The namespace key for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EnvelopeId(pub u64);

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "envelope:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A participant: owner or claimant. The raw ed25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Identity(#[serde(with = "hex32")] pub [u8; 32]);

impl Identity {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<&VerifyingKey> for Identity {
    fn from(key: &VerifyingKey) -> Self {
        Self::from_pubkey(key.to_bytes())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// MintId
// ---------------------------------------------------------------------------

/// Identifier of a fungible token mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MintId(#[serde(with = "hex32")] pub [u8; 32]);

impl fmt::Display for MintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mint:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// EnvelopeAddress
// ---------------------------------------------------------------------------

/// Storage location of an envelope record.
///
/// Derived from `(namespace, id)` alone, so any caller can locate a record
/// without a directory, and two creates for one id always collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EnvelopeAddress(#[serde(with = "hex32")] pub [u8; 32]);

impl EnvelopeAddress {
    /// `SHA-256("lifafa:envelope:v1:" || namespace || id_le)`.
    #[must_use]
    pub fn derive(namespace: &str, id: EnvelopeId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::ENVELOPE_ADDRESS_DOMAIN);
        hasher.update(namespace.as_bytes());
        hasher.update(id.0.to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for EnvelopeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// VaultAddress
// ---------------------------------------------------------------------------

/// Location of the token account that backs a token envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct VaultAddress(#[serde(with = "hex32")] pub [u8; 32]);

impl VaultAddress {
    /// `SHA-256("lifafa:vault:v1:" || envelope_address)`.
    #[must_use]
    pub fn derive(envelope: &EnvelopeAddress) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::VAULT_ADDRESS_DOMAIN);
        hasher.update(envelope.as_bytes());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for VaultAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vault:{}", hex::encode(&self.0[..8]))
    }
}

/// Random ids for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Identity {
    /// A fresh identity backed by a newly generated ed25519 key.
    #[must_use]
    pub fn random() -> Self {
        let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from(&key.verifying_key())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl MintId {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
