//! Seed-reproducible batch of pseudo-random draws.
//!
//! A [`RandomBatch`] is filled once at construction from a `ChaCha8Rng` and
//! then replayed through a wrapping cursor. It is the only source of
//! randomness in a generation run, so every consumer must draw in a fixed
//! order for a seed to reproduce the same island.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of draws held by the batch of a generation run.
pub const DEFAULT_CAPACITY: usize = 100;

/// Exclusive upper bound of the draws of a generation run.
pub const DEFAULT_MAX_VALUE: i32 = i32::MAX;

/// Largest `f32` strictly below 1.0.
const ONE_BELOW: f32 = 1.0 - f32::EPSILON / 2.0;

/// A fixed, pre-computed sequence of integer draws in `[0, max_value)`.
///
/// Not thread-safe by intent: a batch belongs to exactly one run.
#[derive(Clone, Debug)]
pub struct RandomBatch {
    seed: u32,
    buffer: Vec<i32>,
    cursor: usize,
    max_value: i32,
}

impl RandomBatch {
    /// Build a batch: discard `offset` draws, then keep `capacity` draws.
    ///
    /// A zero `capacity` is raised to 1 and a non-positive `max_value` to 1
    /// so the batch can always be drawn from.
    pub fn new(seed: u32, capacity: usize, offset: usize, max_value: i32) -> Self {
        let capacity = capacity.max(1);
        let max_value = max_value.max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));

        for _ in 0..offset {
            let _ = rng.random_range(0..max_value);
        }
        let buffer = (0..capacity).map(|_| rng.random_range(0..max_value)).collect();

        Self {
            seed,
            buffer,
            cursor: 0,
            max_value,
        }
    }

    /// The batch a generation run uses for `seed`.
    pub fn for_run(seed: u32) -> Self {
        Self::new(seed, DEFAULT_CAPACITY, 0, DEFAULT_MAX_VALUE)
    }

    /// Seed the batch was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of draws before the sequence repeats.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Exclusive upper bound of [`next`](Self::next).
    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    /// Advance the cursor (wrapping) and return the draw under it.
    ///
    /// The cursor moves before the read, so the first call returns the
    /// second buffered value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> i32 {
        self.cursor = (self.cursor + 1) % self.buffer.len();
        self.buffer[self.cursor]
    }

    /// Next draw normalized into `[0, 1)`.
    pub fn next_f(&mut self) -> f32 {
        let draw = self.next();
        let value = (f64::from(draw) / f64::from(self.max_value)) as f32;
        value.min(ONE_BELOW)
    }

    /// Uniform index into a collection of `len` items (`len > 0`).
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "cannot pick from an empty collection");
        let index = (self.next_f() * len as f32) as usize;
        index.min(len.saturating_sub(1))
    }
}

/// Derive a seed from wall-clock ticks (100 ns units), folded into
/// `(0, i32::MAX)`.
pub fn seed_from_clock() -> u32 {
    let ticks = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() / 100)
        .unwrap_or_default();
    let folded = (ticks % i32::MAX as u128) as u32;
    folded.max(1)
}
