use rand::{SeedableRng, rngs::StdRng};

use astrolabe_core::SimulationProblem;

use super::{Config, Error};

/// Initial radii tried before the main loop, as fractions of the maximum.
pub(super) const SEED_FRACTIONS: [f64; 3] = [0.1, 0.05, 0.5];

/// Estimates the maximum trust-region radius from random feasible points.
///
/// Each coordinate's observed range is capped by the box width, and the
/// largest capped range is the radius.
///
/// # Errors
///
/// Returns an error if a random point has the wrong length, or if the
/// estimate is zero or not finite.
pub(super) fn max_radius<P: SimulationProblem>(problem: &P, config: &Config) -> Result<f64, Error> {
    let dim = problem.dim();
    let mut rng = StdRng::seed_from_u64(config.seed());
    let mut lower = vec![f64::INFINITY; dim];
    let mut upper = vec![f64::NEG_INFINITY; dim];

    for _ in 0..config.bootstrap_samples_per_dim() * dim {
        let x = problem.random_point(&mut rng);
        if x.len() != dim {
            return Err(Error::Dimension {
                expected: dim,
                found: x.len(),
            });
        }
        for (i, v) in x.into_iter().enumerate() {
            lower[i] = lower[i].min(v);
            upper[i] = upper[i].max(v);
        }
    }

    let bounds = problem.bounds();
    let radius = (0..dim)
        .map(|i| (upper[i] - lower[i]).min(bounds.width(i)))
        .fold(0.0, f64::max);

    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(Error::MaxRadius(radius))
    }
}
