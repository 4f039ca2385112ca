//! Injectable randomness.
//!
//! Every stochastic term (jitter, bounce restitution, rescue impulses) draws
//! from a [`RandomSource`]. Stepping hands each particle its own `SmallRng`
//! derived from `(seed, frame, index)`, so the pass gives the same result
//! whatever order or thread the particles are processed on. Tests substitute
//! [`FixedSource`] or [`SequenceSource`] to assert exact outcomes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    /// Next sample in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Sample in `[-0.5, 0.5)`.
    #[inline]
    fn centered(&mut self) -> f32 {
        self.next_f32() - 0.5
    }

    /// Sample in `[lo, hi)`.
    #[inline]
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }

    /// True with probability `p`.
    #[inline]
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

impl RandomSource for SmallRng {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.gen()
    }
}

/// Always returns the same value.
#[derive(Clone, Copy, Debug)]
pub struct FixedSource(pub f32);

impl RandomSource for FixedSource {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.0
    }
}

/// Replays a fixed list of samples, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source that cycles through `values`.
    ///
    /// An empty list behaves like `FixedSource(0.5)`.
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of samples drawn so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// SplitMix64 finalizer.
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic per-particle generator for one frame.
pub fn particle_rng(seed: u64, frame: u64, index: usize) -> SmallRng {
    let s = mix64(mix64(seed ^ mix64(frame)) ^ index as u64);
    SmallRng::seed_from_u64(s)
}

/// Deterministic per-particle generator used while spawning.
pub(crate) fn spawn_rng(seed: u64, index: usize) -> SmallRng {
    // Frame u64::MAX is never reached by stepping.
    particle_rng(seed, u64::MAX, index)
}
