use nalgebra::DVector;

use astrolabe_core::{Bounds, Goal, SimulationProblem, StochasticModel};

use crate::simulation::simulate;

use super::{
    Config, Error,
    budget::Budget,
    error::Interrupt,
    sampling::Sampler,
    visited::{PointId, VisitedLog},
};

/// Everything an iteration needs besides the trust-region state.
///
/// The context owns the budget ledger and the visited log, so every
/// replication the solver issues passes through [`Context::replicate`] or
/// [`Context::spawn`] and is charged exactly once.
pub(super) struct Context<'a, M, P> {
    model: &'a M,
    problem: &'a P,
    pub(super) config: &'a Config,
    pub(super) sampler: Sampler,
    pub(super) budget: Budget,
    pub(super) visited: VisitedLog,
}

impl<'a, M, P> Context<'a, M, P>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    pub(super) fn new(model: &'a M, problem: &'a P, config: &'a Config) -> Self {
        Self {
            model,
            problem,
            config,
            sampler: Sampler::new(config.lambda_min(), problem.dim()),
            budget: Budget::new(problem.budget(), config.overhead_burden()),
            visited: VisitedLog::default(),
        }
    }

    pub(super) fn dim(&self) -> usize {
        self.problem.dim()
    }

    pub(super) fn bounds(&self) -> &Bounds {
        self.problem.bounds()
    }

    pub(super) fn position(&self, id: PointId) -> DVector<f64> {
        DVector::from_column_slice(self.visited.get(id).x())
    }

    /// Returns the point's mean objective, oriented so that lower is better.
    pub(super) fn objective(&self, id: PointId) -> f64 {
        P::Goal::transform(self.visited.get(id).mean())
    }

    pub(super) fn variance(&self, id: PointId) -> f64 {
        self.visited.get(id).variance()
    }

    /// Creates a point at `x` and runs its pilot replications.
    ///
    /// The point is only logged once the ledger has granted the pilot.
    pub(super) fn spawn(&mut self, x: &DVector<f64>, pilot: u64) -> Result<PointId, Interrupt> {
        let granted = self.budget.grant(pilot).ok_or(Interrupt::BudgetExhausted)?;
        let id = self
            .visited
            .push(self.problem.create_point(x.as_slice().to_vec()));
        self.run(id, granted)?;
        Ok(id)
    }

    /// Requests `n` more replications at an existing point.
    pub(super) fn replicate(&mut self, id: PointId, n: u64) -> Result<(), Interrupt> {
        if n == 0 {
            return Ok(());
        }
        let granted = self.budget.grant(n).ok_or(Interrupt::BudgetExhausted)?;
        self.run(id, granted)
    }

    /// Replicates until the point meets the adaptive stopping time.
    pub(super) fn top_up(
        &mut self,
        id: PointId,
        k: usize,
        radius: f64,
        kappa: f64,
    ) -> Result<(), Interrupt> {
        let point = self.visited.get(id);
        let shortfall = self
            .sampler
            .shortfall(point.n_reps(), k, point.variance(), radius, kappa);
        self.replicate(id, shortfall)
    }

    fn run(&mut self, id: PointId, n: u64) -> Result<(), Interrupt> {
        simulate(self.model, self.problem, self.visited.get_mut(id), n).map_err(Error::from)?;
        self.budget.charge(n);
        Ok(())
    }
}
