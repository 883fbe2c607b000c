mod bounds;
mod goal;

pub use bounds::{Bounds, BoundsError};
pub use goal::{Goal, Maximize, Minimize};

use rand::Rng;

use crate::DesignPoint;

/// Defines a simulation optimization problem to be solved.
///
/// A simulation problem maps solver variables to a model input, then computes
/// an objective value from the model input and one stochastic output. Solvers
/// only ever see noisy objective estimates built up from repeated trials.
///
/// Beyond the mapping, the problem describes the search: the box bounds, the
/// replication budget, where to start, and how to draw random feasible points.
pub trait SimulationProblem {
    type Goal: Goal;
    type Input;
    type Output;
    type InputError: std::error::Error + Send + Sync + 'static;
    type ObjectiveError: std::error::Error + Send + Sync + 'static;

    /// Returns the box bounds on the decision variables.
    fn bounds(&self) -> &Bounds;

    /// Returns the number of decision variables.
    fn dim(&self) -> usize {
        self.bounds().dim()
    }

    /// Returns the replication budget available to a solver.
    fn budget(&self) -> u64;

    /// Returns the point from which solvers start.
    fn initial_solution(&self) -> Vec<f64>;

    /// Draws a random feasible decision vector.
    fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64>;

    /// Maps solver variables (`x`) into a model input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be constructed from `x`.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::InputError>;

    /// Computes the objective value from model input/output.
    ///
    /// # Errors
    ///
    /// Returns an error if the objective cannot be computed.
    fn objective(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<f64, Self::ObjectiveError>;

    /// Returns the seed every new point's random stream starts from.
    ///
    /// All points share the same starting stream by default, which gives
    /// common random numbers across design points.
    fn stream_seed(&self) -> u64 {
        0
    }

    /// Creates a fresh, unreplicated point bound to this problem's streams.
    fn create_point(&self, x: Vec<f64>) -> DesignPoint {
        DesignPoint::seeded(x, self.stream_seed())
    }
}
