//! Slot-seeded xorshift generator.
//!
//! Deterministic and cheap, not unpredictable: anyone who knows the slot
//! can reproduce every draw. Useful for replaying a claim sequence, not as
//! a source of fairness against adversarial claimants.

use rand::{Error, RngCore};
use sha2::{Digest, Sha256};

const MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

// xorshift never leaves the all-zero state
const ZERO_SEED_FALLBACK: u64 = 0x9E37_79B9_7F4A_7C15;

/// xorshift64* over a 64-bit state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { ZERO_SEED_FALLBACK } else { seed };
        Self { state }
    }

    /// Seed from the first 8 bytes (big-endian) of `SHA-256(slot)`.
    #[must_use]
    pub fn from_slot(slot: u64) -> Self {
        let digest = Sha256::digest(slot.to_be_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        Self::new(u64::from_be_bytes(seed))
    }
}

impl RngCore for XorShiftRng {
    #[allow(clippy::cast_possible_truncation)]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 12;
        x ^= x >> 25;
        x ^= x << 27;
        self.state = x;
        x.wrapping_mul(MULTIPLIER)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
