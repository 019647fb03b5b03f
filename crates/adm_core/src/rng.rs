// crates/adm_core/src/rng.rs
//
// Deterministic, integer-only RNG for merit lottery ties (`merit_tie_policy = random`).
// The tie seed is the only source of randomness; the ChaCha20 seed mapping is
// explicit so streams match across platforms.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Deterministic RNG for ties, seeded only from `Params::tie_seed`.
///
/// The 64-bit seed goes little-endian into the first 8 bytes of the ChaCha20
/// 32-byte seed; the remaining 24 bytes are zero.
#[derive(Debug, Clone)]
pub struct TieRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl TieRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    /// Number of 64-bit words drawn so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    /// Raw 64-bit draw; used as a per-applicant lottery key.
    #[inline]
    pub fn next_key(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }
}
