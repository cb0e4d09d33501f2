//! System-wide constants for the Lifafa envelope escrow.

/// Default namespace tag mixed into every envelope address.
pub const DEFAULT_NAMESPACE: &str = "lifafa";

/// Domain separator for envelope address derivation.
pub const ENVELOPE_ADDRESS_DOMAIN: &[u8] = b"lifafa:envelope:v1:";

/// Domain separator for token vault address derivation.
pub const VAULT_ADDRESS_DOMAIN: &[u8] = b"lifafa:vault:v1:";

/// Upper bound on `max_claims` for a single envelope.
pub const MAX_CLAIMS_ALLOWED: u64 = 1000;

/// Maximum owner display name length in bytes.
pub const MAX_OWNER_NAME_LEN: usize = 32;

/// Maximum description length in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 50;

/// Claim mode wire code: sentinel, always rejected at creation.
pub const CLAIM_MODE_NONE: u8 = 0;

/// Claim mode wire code: randomized split.
pub const CLAIM_MODE_RANDOM: u8 = 1;

/// Claim mode wire code: equal split.
pub const CLAIM_MODE_EQUAL: u8 = 2;

/// Serialized size of an envelope record account (discriminator included).
pub const ENVELOPE_RECORD_SIZE: usize = 219;

/// Serialized size of a token account.
pub const TOKEN_ACCOUNT_SIZE: usize = 165;

/// Rent-exempt minimum for an account of `data_len` bytes:
/// `(data_len + 128) * 3480 * 2`.
#[must_use]
pub const fn rent_exempt(data_len: usize) -> u64 {
    ((data_len as u64) + 128) * 3480 * 2
}

/// Default native reserve held by every envelope record.
pub const DEFAULT_RECORD_RENT: u64 = rent_exempt(ENVELOPE_RECORD_SIZE);

/// Default native reserve held by a token vault account.
pub const DEFAULT_TOKEN_ACCOUNT_RENT: u64 = rent_exempt(TOKEN_ACCOUNT_SIZE);
