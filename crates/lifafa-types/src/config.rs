//! Configuration for an envelope registry.

use serde::{Deserialize, Serialize};

use crate::{LifafaError, Result, constants};

/// Whether `time_limit` gates claims or is display-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Claims at or after `creation_time + time_limit` fail with `Expired`.
    #[default]
    Enforced,
    /// The window is recorded but never checked.
    Informational,
}

/// Registry-wide limits and rent reserves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Namespace tag mixed into every envelope address.
    pub namespace: String,
    /// Upper bound on `max_claims` per envelope.
    pub max_claims_allowed: u64,
    /// Maximum owner display name length in bytes.
    pub max_owner_name_len: usize,
    /// Maximum description length in bytes.
    pub max_description_len: usize,
    pub expiry: ExpiryPolicy,
    /// Native reserve held by each envelope record, refunded on delete.
    pub record_rent: u64,
    /// Extra native reserve held by a token vault account.
    pub token_account_rent: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: constants::DEFAULT_NAMESPACE.to_string(),
            max_claims_allowed: constants::MAX_CLAIMS_ALLOWED,
            max_owner_name_len: constants::MAX_OWNER_NAME_LEN,
            max_description_len: constants::MAX_DESCRIPTION_LEN,
            expiry: ExpiryPolicy::default(),
            record_rent: constants::DEFAULT_RECORD_RENT,
            token_account_rent: constants::DEFAULT_TOKEN_ACCOUNT_RENT,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` for bad values.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// A config with no rent reserves; keeps balance arithmetic in tests
    /// down to the escrowed amounts.
    #[must_use]
    pub fn rent_free() -> Self {
        Self {
            record_rent: 0,
            token_account_rent: 0,
            ..Self::default()
        }
    }

    /// # Errors
    /// `Configuration` if the namespace is empty or no claims are allowed.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(LifafaError::Configuration(
                "namespace must not be empty".to_string(),
            ));
        }
        if self.max_claims_allowed == 0 {
            return Err(LifafaError::Configuration(
                "max_claims_allowed must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Native reserve an envelope of this asset kind locks up.
    #[must_use]
    pub fn rent_for(&self, asset: &crate::Asset) -> u64 {
        if asset.is_native() {
            self.record_rent
        } else {
            self.record_rent.saturating_add(self.token_account_rent)
        }
    }
}
