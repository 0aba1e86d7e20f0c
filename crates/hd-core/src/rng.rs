//! Deterministic simulation RNG.
//!
//! # Determinism strategy
//!
//! A run owns one root seed.  Each independent random stream (one per ticket
//! for discharge durations) gets its own `SmallRng` seeded by:
//!
//!   seed = root_seed XOR (stream * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive stream numbers uniformly across the seed space.
//! A ticket's draws therefore do not depend on how many other tickets sampled
//! before it, so reordering same-instant events never changes a duration.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded RNG used for every stochastic draw in a run.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Independent stream `stream` derived from `root_seed`.
    pub fn for_stream(root_seed: u64, stream: u64) -> Self {
        SimRng::new(root_seed ^ stream.wrapping_mul(MIXING_CONSTANT))
    }

    /// The underlying generator, for `rand_distr` sampling.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
