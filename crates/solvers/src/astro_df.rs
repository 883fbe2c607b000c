//! Adaptive-sampling trust-region search for noisy simulation objectives.
//!
//! # Algorithm
//!
//! ASTRO-DF minimizes an objective that can only be estimated by averaging
//! replications of a stochastic model. Each iteration:
//!
//! 1. Samples `2d+1` interpolation nodes around the incumbent and fits a
//!    diagonal quadratic through their mean estimates, shrinking the sampling
//!    radius while the model's gradient is small relative to it.
//! 2. Minimizes the model inside the trust region (Cauchy point by default,
//!    or the exact solution of the diagonal subproblem).
//! 3. Samples the candidate and compares the observed improvement with the
//!    predicted one. A node that clearly beats the candidate replaces it.
//! 4. Accepts or rejects, and grows or shrinks the radius accordingly.
//!
//! Every point is replicated until its estimate is trustworthy relative to
//! the current radius: the stopping time grows with the point's sample
//! variance and with `1/δ⁴`, and slowly with the iteration counter.
//!
//! From the second iteration on, previously visited points inside the trust
//! region are reused. The interpolation basis is rotated toward the farthest
//! one so its replications are not wasted, and a least-squares surrogate of
//! the sample variance steers one node toward the quietest part of the
//! region.
//!
//! Before the main loop, the maximum radius is estimated from random
//! feasible points, and a single iteration is run from three seed radii. The
//! seed with the best resulting objective continues.
//!
//! # Budget
//!
//! Every simulate call is charged its replications plus the configured
//! overhead. Once the budget is spent, the iteration in flight is abandoned
//! and the recommendations made so far are returned, so the final expended
//! budget overshoots the limit by at most `1 + overhead`.
//!
//! # Observer Events
//!
//! - [`Event::Bootstrapped`] once per seed radius
//! - [`Event::Iterated`] after every main-loop iteration
//!
//! Observers can return [`Action::StopEarly`] to halt after either event.

mod action;
mod basis;
mod bootstrap;
mod budget;
mod config;
mod construct;
mod context;
mod error;
mod event;
mod init;
mod iterate;
mod placement;
mod sampling;
mod search;
mod solution;
mod state;
mod step;
mod surrogate;
mod visited;

#[cfg(test)]
mod test_utils;

pub use action::Action;
pub use config::{Config, ConfigBuilder, ConfigError};
pub use error::Error;
pub use event::{Event, Outcome};
pub use solution::{Recommendation, Solution, Status};

use astrolabe_core::{Observer, SimulationProblem, StochasticModel};

use search::search;

/// Optimizes the problem's objective in the direction of its [`Goal`].
///
/// The observer receives an [`Event`] for each bootstrap seed and each
/// main-loop iteration. See the [module docs](self) for details.
///
/// # Errors
///
/// Returns an error if the initial solution has the wrong length, if no
/// usable maximum radius can be estimated, or if the model or problem fails
/// during a replication.
///
/// [`Goal`]: astrolabe_core::Goal
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    search(model, problem, config, observer)
}

/// Optimizes the problem's objective without observer support.
///
/// This is a convenience wrapper around [`solve`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error under the same conditions as [`solve`].
pub fn solve_unobserved<M, P>(model: &M, problem: &P, config: &Config) -> Result<Solution, Error>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    solve(model, problem, config, ())
}
