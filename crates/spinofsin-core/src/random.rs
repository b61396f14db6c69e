//! Random source collaborator.
//!
//! Jitter and procedural presets draw from a [`RandomSource`]. The default
//! implementation is a seeded `ChaCha8` stream, so a seed plus an input script
//! replays exactly. Not suitable for anything that needs fairness guarantees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform randomness for the game.
pub trait RandomSource {
    /// A sample in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// A fair coin; true when the unit sample is above one half.
    fn coin(&mut self) -> bool {
        self.unit() > 0.5
    }

    /// An index in `0..n`. `n` must be positive.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn below(&mut self, n: usize) -> usize {
        let pick = (self.unit() * n as f64).floor() as usize;
        pick.min(n.saturating_sub(1))
    }

    /// `+1.0` or `-1.0`.
    fn sign(&mut self) -> f64 {
        if self.coin() {
            1.0
        } else {
            -1.0
        }
    }
}

/// Seeded `ChaCha8` randomness.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRandom {
    /// Creates a stream from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            self.rng.gen_range(0..n)
        }
    }
}
