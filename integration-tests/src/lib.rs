//! Synthetic stochastic models and problems for end-to-end solver tests.

pub mod models;
pub mod problem;

pub use models::{Himmelblau, NoisyBowl, NoiseError, SigmaVersion};
pub use problem::BoxProblem;
