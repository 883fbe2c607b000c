use rand::{SeedableRng, rngs::StdRng};

/// A decision vector together with the running statistics of its replications.
///
/// Points are created unreplicated, bound to their own random stream, and are
/// only ever extended by recording more replications. The mean and variance
/// are maintained online (Welford), so recording a replication is `O(1)`.
#[derive(Debug, Clone)]
pub struct DesignPoint {
    x: Vec<f64>,
    n_reps: u64,
    mean: f64,
    m2: f64,
    rng: StdRng,
}

impl DesignPoint {
    /// Creates an unreplicated point that draws its noise from `rng`.
    #[must_use]
    pub fn new(x: Vec<f64>, rng: StdRng) -> Self {
        Self {
            x,
            n_reps: 0,
            mean: 0.0,
            m2: 0.0,
            rng,
        }
    }

    /// Creates an unreplicated point whose stream starts from `seed`.
    #[must_use]
    pub fn seeded(x: Vec<f64>, seed: u64) -> Self {
        Self::new(x, StdRng::seed_from_u64(seed))
    }

    /// Returns the decision vector.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Returns the number of replications recorded so far.
    #[must_use]
    pub fn n_reps(&self) -> u64 {
        self.n_reps
    }

    /// Returns the sample mean of the recorded objective values.
    ///
    /// This is `0.0` for an unreplicated point.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the unbiased sample variance of the recorded objective values.
    ///
    /// Fewer than two replications carry no spread information, so the
    /// variance is `0.0` in that case.
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.n_reps < 2 {
            0.0
        } else {
            self.m2 / (self.n_reps - 1) as f64
        }
    }

    /// Returns the point's random stream.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Records one replication's objective value.
    pub fn record(&mut self, value: f64) {
        self.n_reps += 1;
        let delta = value - self.mean;
        self.mean += delta / self.n_reps as f64;
        self.m2 += delta * (value - self.mean);
    }
}
