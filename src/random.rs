// Seeded Gaussian sources for the random completion in the orthogonal complement.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
#[cfg(test)]
use rand_distr::{Distribution, Normal};

/// Supplier of standard normal samples.
pub trait GaussianSource {
    fn next_gaussian(&mut self) -> f64;
}

/// ChaCha8-backed standard normal source; identical seeds give identical streams.
#[derive(Clone, Debug)]
pub struct ChaChaGaussian {
    rng: ChaCha8Rng,
}

impl ChaChaGaussian {
    pub fn new(seed: u64) -> Self {
        ChaChaGaussian {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for ChaChaGaussian {
    fn default() -> Self {
        ChaChaGaussian::new(0)
    }
}

impl GaussianSource for ChaChaGaussian {
    fn next_gaussian(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

/// Normal source with caller-chosen mean and standard deviation, used to
/// drive the completion with non-standard draws in tests.
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ScaledGaussian {
    rng: ChaCha8Rng,
    normal: Normal<f64>,
}

#[cfg(test)]
impl ScaledGaussian {
    /// Returns `None` when `std_dev` is negative or not finite.
    pub(crate) fn new(seed: u64, mean: f64, std_dev: f64) -> Option<Self> {
        let normal = Normal::new(mean, std_dev).ok()?;
        Some(ScaledGaussian {
            rng: ChaCha8Rng::seed_from_u64(seed),
            normal,
        })
    }
}

#[cfg(test)]
impl GaussianSource for ScaledGaussian {
    fn next_gaussian(&mut self) -> f64 {
        self.normal.sample(&mut self.rng)
    }
}

impl<G: GaussianSource + ?Sized> GaussianSource for &mut G {
    fn next_gaussian(&mut self) -> f64 {
        (**self).next_gaussian()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = ChaChaGaussian::new(42);
        let mut b = ChaChaGaussian::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_gaussian(), b.next_gaussian());
        }
    }

    #[test]
    fn sample_moments_are_plausible() {
        let mut g = ChaChaGaussian::default();
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| g.next_gaussian()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "variance {}", var);
    }

    #[test]
    fn scaled_source_rejects_bad_deviation() {
        assert!(ScaledGaussian::new(0, 0.0, -1.0).is_none());
        let mut g = ScaledGaussian::new(3, 10.0, 0.0).unwrap();
        assert_eq!(g.next_gaussian(), 10.0);
    }
}
