/// Floor on variance estimates taken from the variance surrogate.
const VARIANCE_FLOOR: f64 = 1e-5;

/// Adaptive sample-size rules.
///
/// The sample size grows slowly with the iteration counter `k` and with the
/// ratio of noise to the squared trust-region radius, so that estimates
/// sharpen as the region shrinks.
#[derive(Debug, Clone, Copy)]
pub(super) struct Sampler {
    lambda_min: f64,
    dim: usize,
}

impl Sampler {
    pub(super) fn new(lambda_min: u32, dim: usize) -> Self {
        Self {
            lambda_min: f64::from(lambda_min),
            dim,
        }
    }

    /// Returns the minimum sample size `λ_k` for iteration `k`.
    pub(super) fn lambda(&self, k: usize) -> f64 {
        let floor = self.lambda_min.max(2.0 * (self.dim as f64).log10());
        let growth = (k as f64 + 0.1).log10().powf(1.01).max(1.0);
        floor * growth
    }

    /// Returns the stopping time `N_k` for a point with sample `variance`.
    ///
    /// A `kappa` of exactly zero is treated as one.
    pub(super) fn stopping_time(&self, k: usize, variance: f64, radius: f64, kappa: f64) -> u64 {
        let kappa = if kappa == 0.0 { 1.0 } else { kappa };
        let lambda = self.lambda(k);
        let scaled = lambda * variance / (kappa.powi(2) * radius.powi(4));
        lambda.max(scaled).ceil() as u64
    }

    /// Returns how many more replications a point with `n_reps` needs.
    pub(super) fn shortfall(
        &self,
        n_reps: u64,
        k: usize,
        variance: f64,
        radius: f64,
        kappa: f64,
    ) -> u64 {
        self.stopping_time(k, variance, radius, kappa)
            .saturating_sub(n_reps)
    }

    /// Returns the pilot size for new points when no variance estimate exists.
    pub(super) fn pilot(&self, k: usize) -> u64 {
        self.lambda(k).ceil() as u64
    }

    /// Returns the pilot size used during the first iteration.
    pub(super) fn initial_pilot(&self) -> u64 {
        (self.lambda_min.max(0.5 * self.dim as f64) - 1.0).floor() as u64
    }

    /// Returns the pilot size for a new point given a surrogate variance
    /// estimate at its location.
    ///
    /// An estimate that exceeds the center's variance by more than `100·δ` is
    /// treated as unreliable and ignored.
    pub(super) fn guided_pilot(
        &self,
        estimate: Option<f64>,
        center_variance: f64,
        k: usize,
        radius: f64,
        kappa: f64,
    ) -> u64 {
        match estimate {
            Some(v) => {
                let v = v.max(VARIANCE_FLOOR);
                if v > center_variance + 100.0 * radius {
                    self.pilot(k)
                } else {
                    self.stopping_time(k, v, radius, kappa)
                }
            }
            None => self.pilot(k),
        }
    }
}
