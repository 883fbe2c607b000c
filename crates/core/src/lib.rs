//! Core traits and types for the Astrolabe framework.
//!
//! This crate defines the shared abstractions that solvers, observers, and
//! stochastic models build on:
//!
//! - [`StochasticModel`] — a noisy callable that maps a typed input to one
//!   sampled output per trial
//! - [`SimulationProblem`] — adapts solver variables to model inputs, extracts
//!   an objective from outputs, and describes bounds, budget, and start point
//! - [`DesignPoint`] — a decision vector with the running statistics of its
//!   replications
//! - [`Observer`] — receives solver events and optionally returns control actions

mod model;
mod observer;
mod point;
mod problem;

pub use model::StochasticModel;
pub use observer::Observer;
pub use point::DesignPoint;
pub use problem::{Bounds, BoundsError, Goal, Maximize, Minimize, SimulationProblem};
