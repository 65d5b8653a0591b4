//! Injectable randomness.
//!
//! Every stochastic decision in the crate (leaf orientation, wind phase,
//! gusts, shedding) pulls from a [`RandomSource`] owned by the caller, so a
//! seeded generator reproduces a run exactly.

use rand::Rng;

/// A stream of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Useful for pinning down exactly which branch of a stochastic rule fires.
#[derive(Clone, Debug)]
pub struct SequenceSource {
    draws: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    /// # Panics
    /// Panics if `draws` is empty.
    pub fn new(draws: Vec<f32>) -> Self {
        assert!(!draws.is_empty(), "SequenceSource needs at least one draw");
        Self { draws, cursor: 0 }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    pub fn taken(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f32 {
        let v = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        v
    }
}
