//! Seeded Random Number Generator
//!
//! Uses Xorshift128+ for fast, reproducible randomness.
//! Every random decision in the game (bug placement, decoy jitter,
//! near-hit detection rolls, snippet and portal picks) draws from a
//! [`RandomSource`], so tests can replace it with a fixed sequence.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Source of randomness injected into the game logic.
pub trait RandomSource {
    /// Uniform integer in `[min, max]` (inclusive). Returns `min` when `min >= max`.
    fn next_int_range(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, len)`. Returns 0 for an empty range.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let max = i32::try_from(len - 1).unwrap_or(i32::MAX);
        self.next_int_range(0, max) as usize
    }
}

/// PRNG using the Xorshift128+ algorithm.
///
/// Given the same seed, produces the exact same sequence on any platform.
///
/// # Example
///
/// ```
/// use bug_hunt::core::rng::{DeterministicRng, RandomSource};
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_int_range(1, 50), b.next_int_range(1, 50));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG seeded from fresh process entropy.
    pub fn from_entropy() -> Self {
        let nonce = uuid::Uuid::new_v4();
        let now = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        Self::new(derive_seed(nonce.as_bytes(), &now.to_le_bytes()))
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

impl RandomSource for DeterministicRng {
    #[inline]
    fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max as i64 - min as i64 + 1) as u64;
        // Simple modulo - slight bias for very large ranges, but acceptable
        (min as i64 + (self.next_u64() % range) as i64) as i32
    }

    #[inline]
    fn next_unit(&mut self) -> f64 {
        // Top 53 bits fill the mantissa exactly
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a 64-bit seed from a nonce and extra entropy.
///
/// Same inputs always give the same seed.
pub fn derive_seed(nonce: &[u8], entropy: &[u8]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"BUG_HUNT_SEED_V1");
    hasher.update(nonce);
    hasher.update(entropy);

    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

/// Replays a fixed script of values, cycling when exhausted. Integer
/// draws are clamped into the requested range.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    ints: Vec<i32>,
    units: Vec<f64>,
    int_cursor: usize,
    unit_cursor: usize,
}

impl ScriptedSource {
    /// Create a source replaying `ints` for integer draws and `units` for unit draws.
    pub fn new(ints: Vec<i32>, units: Vec<f64>) -> Self {
        Self { ints, units, int_cursor: 0, unit_cursor: 0 }
    }

    /// Source that only scripts unit draws.
    pub fn units(units: Vec<f64>) -> Self {
        Self::new(Vec::new(), units)
    }
}

impl RandomSource for ScriptedSource {
    fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if self.ints.is_empty() {
            return min;
        }
        let value = self.ints[self.int_cursor % self.ints.len()];
        self.int_cursor += 1;
        value.clamp(min, max.max(min))
    }

    fn next_unit(&mut self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        let value = self.units[self.unit_cursor % self.units.len()];
        self.unit_cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

// =============================================================================
// TESTS
// =============================================================================
