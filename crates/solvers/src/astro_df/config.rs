use thiserror::Error;

/// Configuration for the ASTRO-DF solver.
///
/// A `Config` is always valid: it can only be obtained from
/// [`Config::default`] or through [`ConfigBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ConfigBuilder", into = "ConfigBuilder")
)]
pub struct Config {
    eta_1: f64,
    eta_2: f64,
    gamma_1: f64,
    gamma_2: f64,
    w: f64,
    mu: f64,
    beta: f64,
    lambda_min: u32,
    simple_solve: bool,
    criticality_select: bool,
    reuse_points: bool,
    criticality_threshold: f64,
    overhead_burden: u64,
    bootstrap_samples_per_dim: usize,
    seed: u64,
}

/// Errors that can occur when validating an ASTRO-DF config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("eta_1 must be finite and positive")]
    Eta1,

    #[error("eta_2 must be finite and greater than eta_1")]
    Eta2,

    #[error("gamma_1 must be finite and greater than 1")]
    Gamma1,

    #[error("gamma_2 must lie strictly between 0 and 1")]
    Gamma2,

    #[error("w must lie strictly between 0 and 1")]
    W,

    #[error("beta must be positive and mu must be finite and greater than beta")]
    BetaMu,

    #[error("lambda_min must be greater than 2")]
    LambdaMin,

    #[error("criticality_threshold must be finite and positive")]
    CriticalityThreshold,

    #[error("bootstrap_samples_per_dim must be at least 1")]
    BootstrapSamples,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_builder(ConfigBuilder::default())
    }
}

impl Config {
    /// Starts a builder seeded with the default settings.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    fn from_builder(b: ConfigBuilder) -> Self {
        Self {
            eta_1: b.eta_1,
            eta_2: b.eta_2,
            gamma_1: b.gamma_1,
            gamma_2: b.gamma_2,
            w: b.w,
            mu: b.mu,
            beta: b.beta,
            lambda_min: b.lambda_min,
            simple_solve: b.simple_solve,
            criticality_select: b.criticality_select,
            reuse_points: b.reuse_points,
            criticality_threshold: b.criticality_threshold,
            overhead_burden: b.overhead_burden,
            bootstrap_samples_per_dim: b.bootstrap_samples_per_dim,
            seed: b.seed,
        }
    }

    /// Returns the success ratio above which an iteration is successful.
    #[must_use]
    pub fn eta_1(&self) -> f64 {
        self.eta_1
    }

    /// Returns the success ratio above which an iteration is very successful.
    #[must_use]
    pub fn eta_2(&self) -> f64 {
        self.eta_2
    }

    /// Returns the radius expansion factor.
    #[must_use]
    pub fn gamma_1(&self) -> f64 {
        self.gamma_1
    }

    /// Returns the radius contraction factor.
    #[must_use]
    pub fn gamma_2(&self) -> f64 {
        self.gamma_2
    }

    /// Returns the shrink factor applied on each criticality pass.
    #[must_use]
    pub fn w(&self) -> f64 {
        self.w
    }

    #[must_use]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Returns the minimum sample size scale.
    #[must_use]
    pub fn lambda_min(&self) -> u32 {
        self.lambda_min
    }

    /// Returns true if the subproblem is solved by the Cauchy point.
    #[must_use]
    pub fn simple_solve(&self) -> bool {
        self.simple_solve
    }

    #[must_use]
    pub fn criticality_select(&self) -> bool {
        self.criticality_select
    }

    /// Returns true if visited points may seed rotated interpolation sets.
    #[must_use]
    pub fn reuse_points(&self) -> bool {
        self.reuse_points
    }

    #[must_use]
    pub fn criticality_threshold(&self) -> f64 {
        self.criticality_threshold
    }

    /// Returns the extra budget charged for every simulate call.
    #[must_use]
    pub fn overhead_burden(&self) -> u64 {
        self.overhead_burden
    }

    /// Returns how many random points per dimension estimate the maximum radius.
    #[must_use]
    pub fn bootstrap_samples_per_dim(&self) -> usize {
        self.bootstrap_samples_per_dim
    }

    /// Returns the seed of the stream used to draw bootstrap points.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Builder for [`Config`].
///
/// Every setting starts at its default, and [`build`](Self::build) checks the
/// ordering constraints between them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ConfigBuilder {
    eta_1: f64,
    eta_2: f64,
    gamma_1: f64,
    gamma_2: f64,
    w: f64,
    mu: f64,
    beta: f64,
    lambda_min: u32,
    simple_solve: bool,
    criticality_select: bool,
    reuse_points: bool,
    criticality_threshold: f64,
    overhead_burden: u64,
    bootstrap_samples_per_dim: usize,
    seed: u64,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            eta_1: 0.1,
            eta_2: 0.5,
            gamma_1: 1.5,
            gamma_2: 0.75,
            w: 0.85,
            mu: 1000.0,
            beta: 10.0,
            lambda_min: 5,
            simple_solve: true,
            criticality_select: true,
            reuse_points: true,
            criticality_threshold: 0.1,
            overhead_burden: 0,
            bootstrap_samples_per_dim: 10_000,
            seed: 0,
        }
    }
}

impl From<Config> for ConfigBuilder {
    fn from(c: Config) -> Self {
        Self {
            eta_1: c.eta_1,
            eta_2: c.eta_2,
            gamma_1: c.gamma_1,
            gamma_2: c.gamma_2,
            w: c.w,
            mu: c.mu,
            beta: c.beta,
            lambda_min: c.lambda_min,
            simple_solve: c.simple_solve,
            criticality_select: c.criticality_select,
            reuse_points: c.reuse_points,
            criticality_threshold: c.criticality_threshold,
            overhead_burden: c.overhead_burden,
            bootstrap_samples_per_dim: c.bootstrap_samples_per_dim,
            seed: c.seed,
        }
    }
}

impl TryFrom<ConfigBuilder> for Config {
    type Error = ConfigError;

    fn try_from(builder: ConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn with_eta_1(mut self, eta_1: f64) -> Self {
        self.eta_1 = eta_1;
        self
    }

    #[must_use]
    pub fn with_eta_2(mut self, eta_2: f64) -> Self {
        self.eta_2 = eta_2;
        self
    }

    #[must_use]
    pub fn with_gamma_1(mut self, gamma_1: f64) -> Self {
        self.gamma_1 = gamma_1;
        self
    }

    #[must_use]
    pub fn with_gamma_2(mut self, gamma_2: f64) -> Self {
        self.gamma_2 = gamma_2;
        self
    }

    #[must_use]
    pub fn with_w(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    #[must_use]
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    #[must_use]
    pub fn with_lambda_min(mut self, lambda_min: u32) -> Self {
        self.lambda_min = lambda_min;
        self
    }

    #[must_use]
    pub fn with_simple_solve(mut self, simple_solve: bool) -> Self {
        self.simple_solve = simple_solve;
        self
    }

    #[must_use]
    pub fn with_criticality_select(mut self, criticality_select: bool) -> Self {
        self.criticality_select = criticality_select;
        self
    }

    #[must_use]
    pub fn with_reuse_points(mut self, reuse_points: bool) -> Self {
        self.reuse_points = reuse_points;
        self
    }

    #[must_use]
    pub fn with_criticality_threshold(mut self, threshold: f64) -> Self {
        self.criticality_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_overhead_burden(mut self, overhead_burden: u64) -> Self {
        self.overhead_burden = overhead_burden;
        self
    }

    #[must_use]
    pub fn with_bootstrap_samples_per_dim(mut self, samples: usize) -> Self {
        self.bootstrap_samples_per_dim = samples;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the settings and produces a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checked in declaration order.
    pub fn build(self) -> Result<Config, ConfigError> {
        if !(self.eta_1.is_finite() && self.eta_1 > 0.0) {
            return Err(ConfigError::Eta1);
        }
        if !(self.eta_2.is_finite() && self.eta_2 > self.eta_1) {
            return Err(ConfigError::Eta2);
        }
        if !(self.gamma_1.is_finite() && self.gamma_1 > 1.0) {
            return Err(ConfigError::Gamma1);
        }
        if !(self.gamma_2 > 0.0 && self.gamma_2 < 1.0) {
            return Err(ConfigError::Gamma2);
        }
        if !(self.w > 0.0 && self.w < 1.0) {
            return Err(ConfigError::W);
        }
        if !(self.beta > 0.0 && self.mu.is_finite() && self.beta < self.mu) {
            return Err(ConfigError::BetaMu);
        }
        if self.lambda_min <= 2 {
            return Err(ConfigError::LambdaMin);
        }
        if !(self.criticality_threshold.is_finite() && self.criticality_threshold > 0.0) {
            return Err(ConfigError::CriticalityThreshold);
        }
        if self.bootstrap_samples_per_dim == 0 {
            return Err(ConfigError::BootstrapSamples);
        }

        Ok(Config::from_builder(self))
    }
}
