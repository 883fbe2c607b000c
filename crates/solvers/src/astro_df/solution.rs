/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The replication budget ran out during the main loop.
    BudgetExhausted,

    /// Stopped early due to an observer decision.
    StoppedByObserver,

    /// The budget ran out before any bootstrap seed finished.
    BootstrapExhausted,
}

/// A point the solver recommended, with the budget at which it did so.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// The decision vector.
    pub x: Vec<f64>,

    /// The mean objective at the end of the search, in the problem's own
    /// orientation.
    pub objective: f64,

    /// Replications behind `objective`.
    pub n_reps: u64,

    /// Expended budget when the point was recommended.
    pub budget: u64,
}

/// The result of an ASTRO-DF search.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Recommended points in order, with non-decreasing budgets.
    pub recommended: Vec<Recommendation>,

    /// Total budget charged, including per-call overhead.
    pub expended_budget: u64,

    /// Number of simulate calls issued.
    pub simulate_calls: u64,

    /// Iteration counter when the solver finished.
    pub iters: usize,

    /// The estimated maximum trust-region radius.
    pub max_radius: f64,

    /// The trust-region radius when the solver finished.
    pub radius: f64,
}

impl Solution {
    /// Returns the last recommendation, if any.
    #[must_use]
    pub fn best(&self) -> Option<&Recommendation> {
        self.recommended.last()
    }

    #[must_use]
    pub fn recommended_solutions(&self) -> Vec<&[f64]> {
        self.recommended.iter().map(|r| r.x.as_slice()).collect()
    }

    #[must_use]
    pub fn intermediate_budgets(&self) -> Vec<u64> {
        self.recommended.iter().map(|r| r.budget).collect()
    }
}
