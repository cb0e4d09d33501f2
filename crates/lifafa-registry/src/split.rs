//! Payout sizing.
//!
//! Both modes only ever look at the record, never at the vault, so the
//! record's `remaining` stays the single source of truth for what can be
//! paid.

use lifafa_types::{ClaimMode, Envelope};
use parking_lot::Mutex;
use rand::{Rng, RngCore};

/// Fixed per-claim share: `floor(amount / max_claims)`.
///
/// The indivisible remainder is never paid to a claimant; it stays escrowed
/// until the owner deletes the envelope.
#[must_use]
pub fn equal_share(amount: u64, max_claims: u64) -> u64 {
    amount.checked_div(max_claims).unwrap_or(0)
}

/// Random share of `remaining` for one of `outstanding` open claims.
///
/// The last outstanding claim takes everything. Otherwise the draw is
/// uniform over `[1, min(2r/k, r - (k - 1))]`, which leaves every later
/// claimant at least one unit as long as `remaining >= outstanding`.
pub fn random_share<R: Rng + ?Sized>(remaining: u64, outstanding: u64, rng: &mut R) -> u64 {
    if outstanding <= 1 {
        return remaining;
    }

    let r = u128::from(remaining);
    let k = u128::from(outstanding);
    let upper = (2 * r / k).min(r.saturating_sub(k - 1));
    if upper == 0 {
        return 0;
    }

    // upper <= remaining
    let upper = u64::try_from(upper).unwrap_or(remaining);
    rng.gen_range(1..=upper)
}

/// Size the next claim against `envelope` in its own mode.
///
/// `rng` is locked only for a Random draw.
pub fn payout<R: RngCore + ?Sized>(envelope: &Envelope, rng: &Mutex<Box<R>>) -> u64 {
    match envelope.claim_mode {
        ClaimMode::Equal => equal_share(envelope.amount, envelope.max_claims),
        ClaimMode::Random => {
            let outstanding = envelope.max_claims.saturating_sub(envelope.claims);
            let mut rng = rng.lock();
            random_share(envelope.remaining, outstanding, &mut **rng)
        }
    }
}
