//! The oracle call shared by every solver: replicate a model at a point.

use thiserror::Error;

use astrolabe_core::{DesignPoint, SimulationProblem, StochasticModel};

/// Errors that can occur when simulating a design point.
#[derive(Debug, Error)]
pub enum EvalError<IE, ME, OE> {
    /// Failed to construct the model input from solver variables.
    #[error("failed to compute input")]
    Input(#[source] IE),

    /// A model trial failed.
    #[error("model trial failed")]
    Model(#[source] ME),

    /// Failed to compute the objective from a trial output.
    #[error("failed to compute objective")]
    Objective(#[source] OE),
}

/// Type alias for the result of [`simulate`].
pub type SimulateResult<M, P> = Result<
    (),
    EvalError<
        <P as SimulationProblem>::InputError,
        <M as StochasticModel>::Error,
        <P as SimulationProblem>::ObjectiveError,
    >,
>;

/// Runs `n_reps` independent trials of the model at `point`.
///
/// The input is built once from the point's decision vector, then each trial
/// draws from the point's own random stream and records the resulting
/// objective, in the problem's own orientation, into the point's running
/// statistics. Asking for zero replications is a no-op.
///
/// # Errors
///
/// Returns an error if input mapping, a model trial, or objective computation
/// fails. Replications recorded before the failure are kept.
pub fn simulate<M, P>(
    model: &M,
    problem: &P,
    point: &mut DesignPoint,
    n_reps: u64,
) -> SimulateResult<M, P>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    if n_reps == 0 {
        return Ok(());
    }

    let input = problem.input(point.x()).map_err(EvalError::Input)?;
    for _ in 0..n_reps {
        let output = model
            .replicate(&input, point.rng_mut())
            .map_err(EvalError::Model)?;
        let objective = problem
            .objective(&input, &output)
            .map_err(EvalError::Objective)?;
        point.record(objective);
    }

    Ok(())
}
