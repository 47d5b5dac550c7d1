//! Deterministic simulation RNG.
//!
//! # Determinism strategy
//!
//! All stochastic decisions in the framework — spawn-position noise,
//! weighted profile/state selection — happen in the sequential spawn phase
//! of the step loop, driven by a single `SimRng` seeded from the run's
//! master seed.  The parallel phases are RNG-free by construction, which is
//! what makes runs byte-identical regardless of worker-thread count.
//!
//! `child()` derives an independent stream from the parent, mixing the
//! offset with the 64-bit fractional part of the golden ratio so nearby
//! offsets land far apart in seed space.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level deterministic RNG.
///
/// Used only in single-threaded contexts (the spawn phase, scene setup).
/// If a parallel consumer ever needs randomness, give each worker its own
/// `SimRng` derived via [`SimRng::child`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset — useful for
    /// giving subsystems (e.g. individual generators) independent streams.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
