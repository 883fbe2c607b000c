use std::{convert::Infallible, marker::PhantomData};

use rand::Rng;

use astrolabe_core::{Bounds, BoundsError, Goal, Minimize, SimulationProblem};

/// A box-bounded problem whose objective is the model's scalar output.
///
/// Random points are drawn uniformly from the box, so every bound must be
/// finite.
#[derive(Debug, Clone)]
pub struct BoxProblem<G = Minimize> {
    bounds: Bounds,
    initial: Vec<f64>,
    budget: u64,
    stream_seed: u64,
    goal: PhantomData<G>,
}

impl<G: Goal> BoxProblem<G> {
    /// Creates a problem over the cube `[lower, upper]^d`, where `d` is the
    /// length of `initial`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are invalid.
    pub fn cube(
        initial: Vec<f64>,
        lower: f64,
        upper: f64,
        budget: u64,
    ) -> Result<Self, BoundsError> {
        let bounds = Bounds::uniform(initial.len(), lower, upper)?;
        Ok(Self {
            bounds,
            initial,
            budget,
            stream_seed: 0,
            goal: PhantomData,
        })
    }

    /// Changes the seed every point's replication stream starts from.
    #[must_use]
    pub fn with_stream_seed(mut self, seed: u64) -> Self {
        self.stream_seed = seed;
        self
    }
}

impl<G: Goal> SimulationProblem for BoxProblem<G> {
    type Goal = G;
    type Input = Vec<f64>;
    type Output = f64;
    type InputError = Infallible;
    type ObjectiveError = Infallible;

    fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn budget(&self) -> u64 {
        self.budget
    }

    fn initial_solution(&self) -> Vec<f64> {
        self.initial.clone()
    }

    fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds
            .lower()
            .iter()
            .zip(self.bounds.upper())
            .map(|(&lo, &hi)| rng.random_range(lo..hi))
            .collect()
    }

    fn input(&self, x: &[f64]) -> Result<Vec<f64>, Self::InputError> {
        Ok(x.to_vec())
    }

    fn objective(&self, _input: &Vec<f64>, output: &f64) -> Result<f64, Self::ObjectiveError> {
        Ok(*output)
    }

    fn stream_seed(&self) -> u64 {
        self.stream_seed
    }
}
