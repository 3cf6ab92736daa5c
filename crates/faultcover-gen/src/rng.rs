//! Seeding for the random phase.
//!
//! A run draws every random value from one ChaCha8Rng built from a `u64`
//! seed, so logging the seed is enough to replay a base set.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn generation_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Pick a seed from OS entropy, for runs that did not ask for one.
pub fn fresh_seed() -> u64 {
    rand::random()
}
