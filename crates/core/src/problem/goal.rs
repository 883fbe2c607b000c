/// Defines the optimization direction of a simulation problem.
///
/// Solvers always minimize internally. [`Goal::transform`] maps a raw
/// objective estimate into that minimization frame, so a maximization problem
/// is handled by flipping the sign of every estimate it produces.
pub trait Goal {
    /// Transforms an objective value for internal minimization.
    ///
    /// - [`Minimize`]: returns the value unchanged
    /// - [`Maximize`]: negates the value
    fn transform(value: f64) -> f64;
}

/// Minimize the objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Minimize;

impl Goal for Minimize {
    #[inline]
    fn transform(value: f64) -> f64 {
        value
    }
}

/// Maximize the objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maximize;

impl Goal for Maximize {
    #[inline]
    fn transform(value: f64) -> f64 {
        -value
    }
}
