//! Random draw source.
//!
//! Every stochastic decision in the simulation goes through [`DrawSource`],
//! so a run is reproducible given the same sequence of draws.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform draws consumed by nodes and policies.
pub trait DrawSource {
    /// Uniform integer in `[low, high]`, both bounds inclusive.
    fn uniform_int(&mut self, low: i32, high: i32) -> i32;

    /// Uniform real in `[0, 1)`.
    fn uniform_real(&mut self) -> f64;
}

/// Seedable draw source backed by ChaCha8.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
}

impl SimRng {
    /// Create a draw source from a seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Derive an independent stream for one node of a run.
    ///
    /// Streams for different nodes of the same run never overlap, and the
    /// same `(seed, node)` pair always yields the same stream.
    pub fn for_node(seed: u64, node: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(node as u64);
        Self { rng }
    }
}

impl DrawSource for SimRng {
    fn uniform_int(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn uniform_real(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl<D: DrawSource + ?Sized> DrawSource for &mut D {
    fn uniform_int(&mut self, low: i32, high: i32) -> i32 {
        (**self).uniform_int(low, high)
    }

    fn uniform_real(&mut self) -> f64 {
        (**self).uniform_real()
    }
}
