//! Random path generation
//!
//! [`RandomPathGenerator`] is the only source of randomness in the crate. A run is
//! identified by a single 64-bit seed; every trial draws from its own sub-stream
//! derived from that seed, so trials can be simulated in any order (or on worker
//! threads) and still reproduce the same table bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// A stream of standard normal and uniform variates for one path
pub trait NoiseSource {
    /// Next standard normal variate
    fn standard_normal(&mut self) -> f64;

    /// Next uniform variate in [0, 1)
    fn uniform(&mut self) -> f64;
}

/// Hands out the noise stream for a given trial
///
/// Trial numbering is 1-based, matching the `trial` column of a scenario table.
pub trait StreamFactory: Sync {
    type Stream: NoiseSource;

    fn stream(&self, trial: u32) -> Self::Stream;
}

/// Seeded generator of independent standard normal draws
///
/// # Example
/// ```
/// use economic_scenarios::rng::RandomPathGenerator;
///
/// let mut a = RandomPathGenerator::from_seed(42);
/// let mut b = RandomPathGenerator::from_seed(42);
/// assert_eq!(a.draw(5), b.draw(5));
/// ```
#[derive(Debug, Clone)]
pub struct RandomPathGenerator {
    inner: StdRng,
    seed: u64,
}

impl RandomPathGenerator {
    /// Create a generator from an explicit seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a generator from OS entropy
    ///
    /// The chosen seed is kept so the run can be replayed with [`from_seed`](Self::from_seed).
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::random();
        log::debug!("Generated random seed {}", seed);
        Self::from_seed(seed)
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent child generator for `index`
    ///
    /// Depends only on `(seed, index)`, never on how many draws the parent has made.
    pub fn substream(&self, index: u64) -> Self {
        Self::from_seed(derive_seed(self.seed, index))
    }

    /// Single standard normal variate
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Single uniform variate in [0, 1)
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Draw `n` independent standard normal variates
    pub fn draw(&mut self, n: usize) -> Vec<f64> {
        let mut values = vec![0.0; n];
        self.fill_normal(&mut values);
        values
    }

    /// Fill `buffer` with standard normal variates
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

impl NoiseSource for RandomPathGenerator {
    fn standard_normal(&mut self) -> f64 {
        self.gen_normal()
    }

    fn uniform(&mut self) -> f64 {
        self.gen_uniform()
    }
}

impl StreamFactory for RandomPathGenerator {
    type Stream = RandomPathGenerator;

    fn stream(&self, trial: u32) -> Self::Stream {
        self.substream(trial as u64)
    }
}

/// Deterministic stream that always returns the same values
///
/// `ConstantNoise::zero()` switches off the stochastic term entirely, which turns
/// every discretization into its closed-form drift recursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantNoise {
    pub normal: f64,
    pub uniform: f64,
}

impl ConstantNoise {
    pub fn new(normal: f64, uniform: f64) -> Self {
        Self { normal, uniform }
    }

    /// Zero normal draws; uniform draws fixed at 0.5
    pub fn zero() -> Self {
        Self::new(0.0, 0.5)
    }
}

impl NoiseSource for ConstantNoise {
    fn standard_normal(&mut self) -> f64 {
        self.normal
    }

    fn uniform(&mut self) -> f64 {
        self.uniform
    }
}

impl StreamFactory for ConstantNoise {
    type Stream = ConstantNoise;

    fn stream(&self, _trial: u32) -> Self::Stream {
        *self
    }
}

/// Mix a base seed and a stream index into a child seed
fn derive_seed(base_seed: u64, index: u64) -> u64 {
    splitmix64(base_seed ^ splitmix64(index))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = RandomPathGenerator::from_seed(7);
        let mut b = RandomPathGenerator::from_seed(7);
        assert_eq!(a.draw(100), b.draw(100));
        assert_eq!(a.seed(), 7);
    }

    #[test]
    fn test_draw_zero_is_empty() {
        let mut rng = RandomPathGenerator::from_seed(1);
        assert!(rng.draw(0).is_empty());
    }

    #[test]
    fn test_substreams_independent_of_parent_position() {
        let parent = RandomPathGenerator::from_seed(99);
        let mut advanced = parent.clone();
        advanced.draw(50);

        let mut s1 = parent.substream(3);
        let mut s2 = advanced.substream(3);
        assert_eq!(s1.draw(10), s2.draw(10));

        let mut other = parent.substream(4);
        let mut again = parent.substream(3);
        assert_ne!(other.draw(10), again.draw(10));
    }

    #[test]
    fn test_draws_look_standard_normal() {
        let mut rng = RandomPathGenerator::from_seed(2024);
        let draws = rng.draw(50_000);
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 0.02, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.03, "variance {}", var);
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = RandomPathGenerator::from_seed(5);
        for _ in 0..1000 {
            let u = rng.gen_uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_constant_noise() {
        let factory = ConstantNoise::zero();
        let mut stream = factory.stream(12);
        assert_eq!(stream.standard_normal(), 0.0);
        assert_eq!(stream.uniform(), 0.5);
    }
}
