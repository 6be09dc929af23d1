//! Randomness used by the substitution policy.
//!
//! Every random decision (coin flips and pool picks) goes through [`Coin`],
//! so callers can inject a seeded generator or a scripted sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of random decisions.
pub trait Coin {
    /// Returns `true` with the given probability.
    fn flip(&mut self, probability: f64) -> bool;

    /// Returns a uniformly chosen index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl Coin for StdRng {
    fn flip(&mut self, probability: f64) -> bool {
        // NaN and non-positive values never substitute.
        if !(probability > 0.0) {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.gen_bool(probability)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// A fresh generator for one connection.
pub fn connection_rng() -> StdRng {
    StdRng::from_entropy()
}
