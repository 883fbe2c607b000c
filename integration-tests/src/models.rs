use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

/// Errors raised by the synthetic models.
#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("noise distribution is invalid")]
    Distribution(#[from] NormalError),

    #[error("noise level must be finite and non-negative, got {0}")]
    InvalidSigma(f64),

    #[error("expected an even number of variables, got {0}")]
    OddDimension(usize),
}

/// A quadratic bowl centered at `center` with homoscedastic Gaussian noise.
///
/// One replication returns `‖x − center‖² + ε` with `ε ~ N(0, sigma²)`.
#[derive(Debug, Clone)]
pub struct NoisyBowl {
    center: Vec<f64>,
    sigma: f64,
}

impl NoisyBowl {
    #[must_use]
    pub fn new(center: Vec<f64>, sigma: f64) -> Self {
        Self { center, sigma }
    }

    /// Returns the noise-free value at `x`.
    #[must_use]
    pub fn value(&self, x: &[f64]) -> f64 {
        x.iter()
            .zip(&self.center)
            .map(|(xi, ci)| (xi - ci).powi(2))
            .sum()
    }
}

impl astrolabe_core::StochasticModel for NoisyBowl {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = NoiseError;

    fn replicate<R: Rng + ?Sized>(&self, x: &Vec<f64>, rng: &mut R) -> Result<f64, Self::Error> {
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(NoiseError::InvalidSigma(self.sigma));
        }
        let noise = Normal::new(0.0, self.sigma)?;
        Ok(self.value(x) + noise.sample(rng))
    }
}

/// How the noise level of [`Himmelblau`] varies across the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigmaVersion {
    /// `σ² = |(x − 3)(y − 2)|`, quiet along two lines through the minimizer.
    Saddle,

    /// `σ²` equals the Himmelblau term itself.
    Proportional,

    /// Proportional, plus a penalty for leaving the diagonal.
    Diagonal,

    /// `σ²` equals the full objective.
    Full,
}

impl SigmaVersion {
    fn sigma(self, x: f64, y: f64) -> f64 {
        let himmelblau = himmelblau(x, y);
        let variance = match self {
            Self::Saddle => ((x - 3.0) * (y - 2.0)).abs(),
            Self::Proportional => himmelblau,
            Self::Diagonal => himmelblau + 10.0 * (x - y).powi(2),
            Self::Full => himmelblau + (x - y).powi(2) + (x - 3.0).abs(),
        };
        variance.abs().sqrt()
    }
}

fn himmelblau(x: f64, y: f64) -> f64 {
    (x * x + y - 11.0).powi(2) + (x + y * y - 7.0).powi(2)
}

/// A modified Himmelblau function with heteroscedastic Gaussian noise.
///
/// Variables are taken in consecutive pairs `(x, y)`, each contributing
/// `himmelblau(x, y) + (x − y)² + |x − 3|` plus noise whose spread depends
/// on the pair. The unique minimizer of each pair is near `(3, 2)`.
#[derive(Debug, Clone, Copy)]
pub struct Himmelblau {
    sigma: SigmaVersion,
}

impl Himmelblau {
    #[must_use]
    pub fn new(sigma: SigmaVersion) -> Self {
        Self { sigma }
    }

    /// Returns the noise-free value at `x`.
    #[must_use]
    pub fn value(x: &[f64]) -> f64 {
        x.chunks_exact(2)
            .map(|p| himmelblau(p[0], p[1]) + (p[0] - p[1]).powi(2) + (p[0] - 3.0).abs())
            .sum()
    }
}

impl astrolabe_core::StochasticModel for Himmelblau {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = NoiseError;

    fn replicate<R: Rng + ?Sized>(&self, x: &Vec<f64>, rng: &mut R) -> Result<f64, Self::Error> {
        if x.len() % 2 != 0 {
            return Err(NoiseError::OddDimension(x.len()));
        }

        let mut total = Self::value(x);
        for pair in x.chunks_exact(2) {
            let noise = Normal::new(0.0, self.sigma.sigma(pair[0], pair[1]))?;
            total += noise.sample(rng);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use astrolabe_core::StochasticModel;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn noiseless_bowl_is_exact() {
        let bowl = NoisyBowl::new(vec![1.0, 1.0], 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let y = bowl.replicate(&vec![2.0, -1.0], &mut rng).unwrap();
        assert_relative_eq!(y, 5.0);
    }

    #[test]
    fn invalid_sigma_is_an_error() {
        let mut rng = StdRng::seed_from_u64(3);
        for sigma in [-1.0, f64::NAN, f64::INFINITY] {
            let bowl = NoisyBowl::new(vec![0.0], sigma);
            assert!(matches!(
                bowl.replicate(&vec![0.0], &mut rng),
                Err(NoiseError::InvalidSigma(_))
            ));
        }
    }

    #[test]
    fn himmelblau_is_quiet_on_the_saddle_lines() {
        let model = Himmelblau::new(SigmaVersion::Saddle);
        let x = vec![3.0, 0.5];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5 {
            assert_relative_eq!(model.replicate(&x, &mut rng).unwrap(), Himmelblau::value(&x));
        }
    }

    #[test]
    fn himmelblau_at_origin() {
        // 121 + 49 from the Himmelblau term, 3 from |x − 3|.
        assert_relative_eq!(Himmelblau::value(&[0.0, 0.0]), 173.0);
    }

    #[test]
    fn odd_dimension_is_rejected() {
        let model = Himmelblau::new(SigmaVersion::Full);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            model.replicate(&vec![0.0; 3], &mut rng),
            Err(NoiseError::OddDimension(3))
        ));
    }
}
