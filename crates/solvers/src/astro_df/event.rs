/// How an iteration's candidate compared with the model's prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `ρ ≥ η₂`: the candidate is accepted and the radius grows.
    VerySuccessful,

    /// `η₁ ≤ ρ < η₂`: the candidate is accepted and the radius is kept.
    Successful,

    /// `ρ < η₁`: the candidate is rejected and the radius shrinks.
    Unsuccessful,
}

impl Outcome {
    pub(super) fn classify(rho: f64, eta_1: f64, eta_2: f64) -> Self {
        if rho >= eta_2 {
            Self::VerySuccessful
        } else if rho >= eta_1 {
            Self::Successful
        } else {
            Self::Unsuccessful
        }
    }

    /// Returns true if the candidate replaced the incumbent.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Unsuccessful)
    }
}

/// Events emitted by the ASTRO-DF solver.
///
/// Objective values are oriented for minimization: for a maximization
/// problem they are the negated estimates.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// One bootstrap seed finished its single iteration.
    Bootstrapped {
        /// The initial radius this seed ran with.
        seed_radius: f64,

        /// The seed's final oriented objective estimate.
        objective: f64,

        /// Budget the seed consumed.
        spent: u64,
    },

    /// A main-loop iteration finished.
    Iterated {
        /// The iteration counter.
        k: usize,

        /// The radius after the update.
        radius: f64,

        /// The success ratio.
        rho: f64,

        outcome: Outcome,

        /// The incumbent after the iteration.
        incumbent: &'a [f64],

        /// The incumbent's oriented objective estimate.
        objective: f64,

        /// Total budget expended so far.
        expended_budget: u64,
    },
}
