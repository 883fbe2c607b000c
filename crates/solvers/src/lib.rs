//! Solvers for stochastic simulation optimization problems.
//!
//! A [`SimulationProblem`] maps solver variables `x` to model inputs and
//! extracts a scalar objective from each stochastic model output. Solvers in
//! this crate only ever see noisy estimates built from repeated trials and
//! must decide for themselves how many trials each point deserves.
//!
//! # Solvers
//!
//! - [`astro_df`] — adaptive-sampling trust-region search with local
//!   diagonal-quadratic surrogates and point reuse
//!
//! [`SimulationProblem`]: astrolabe_core::SimulationProblem

pub mod astro_df;
pub mod simulation;
