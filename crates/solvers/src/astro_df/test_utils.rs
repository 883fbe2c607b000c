//! Synthetic models and problems shared by the solver's unit tests.

use std::{convert::Infallible, marker::PhantomData};

use rand::Rng;
use rand_distr::StandardNormal;

use astrolabe_core::{Bounds, Goal, Minimize, SimulationProblem, StochasticModel};

/// A deterministic surface plus optional Gaussian noise.
pub(crate) struct Surface<F> {
    f: F,
    noise: f64,
}

impl<F: Fn(&[f64]) -> f64> Surface<F> {
    pub(crate) fn exact(f: F) -> Self {
        Self { f, noise: 0.0 }
    }

    pub(crate) fn noisy(f: F, noise: f64) -> Self {
        Self { f, noise }
    }
}

impl<F: Fn(&[f64]) -> f64> StochasticModel for Surface<F> {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = Infallible;

    fn replicate<R: Rng + ?Sized>(&self, x: &Vec<f64>, rng: &mut R) -> Result<f64, Self::Error> {
        let eps: f64 = rng.sample(StandardNormal);
        Ok((self.f)(x) + self.noise * eps)
    }
}

/// A box-bounded problem whose objective is the model output itself.
pub(crate) struct TestProblem<G = Minimize> {
    bounds: Bounds,
    initial: Vec<f64>,
    budget: u64,
    goal: PhantomData<G>,
}

impl TestProblem {
    pub(crate) fn new(initial: Vec<f64>, lower: f64, upper: f64, budget: u64) -> Self {
        Self::with_goal(initial, lower, upper, budget)
    }
}

impl<G> TestProblem<G> {
    pub(crate) fn with_goal(initial: Vec<f64>, lower: f64, upper: f64, budget: u64) -> Self {
        Self {
            bounds: Bounds::uniform(initial.len(), lower, upper).expect("valid test bounds"),
            initial,
            budget,
            goal: PhantomData,
        }
    }

    /// Overrides the initial solution without touching the bounds.
    pub(crate) fn starting_at(mut self, initial: Vec<f64>) -> Self {
        self.initial = initial;
        self
    }
}

impl<G: Goal> SimulationProblem for TestProblem<G> {
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
}
