use nalgebra::DVector;

use astrolabe_core::{SimulationProblem, StochasticModel};

use super::{context::Context, error::Interrupt, state::TrustRegionState};

/// Samples the initial center and sets up the state for iteration 1.
///
/// The center gets the first-iteration pilot, then enough replications to
/// meet the stopping time under a provisional `κ = f₀/δ²`. The final `κ` is
/// recomputed from the refined estimate, and the center is logged as the
/// first recommendation.
pub(super) fn init<M, P>(
    ctx: &mut Context<'_, M, P>,
    x0: &DVector<f64>,
    radius: f64,
    max_radius: f64,
) -> Result<TrustRegionState, Interrupt>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let pilot = ctx.sampler.initial_pilot();
    let center = ctx.spawn(x0, pilot)?;

    let provisional = ctx.objective(center) / radius.powi(2);
    ctx.top_up(center, 1, radius, provisional)?;
    let kappa = ctx.objective(center) / radius.powi(2);

    let mut state = TrustRegionState::new(center, radius, max_radius, kappa);
    state.accept(center, ctx.budget.expended());
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::astro_df::{
        Config,
        test_utils::{Surface, TestProblem},
    };

    #[test]
    fn samples_center_and_logs_it() {
        let model = Surface::exact(|x: &[f64]| x[0] + 2.0);
        let problem = TestProblem::new(vec![1.0, 0.0], -5.0, 5.0, 1_000);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);

        let state = init(&mut ctx, &DVector::from_vec(vec![1.0, 0.0]), 0.5, 2.0).unwrap();

        // Pilot of 4, topped up to λ₁ = 5.
        assert_eq!(ctx.visited.get(state.center).n_reps(), 5);
        assert_eq!(ctx.budget.expended(), 5);
        assert_relative_eq!(state.kappa, 12.0);
        assert_eq!(state.k, 1);
        assert_eq!(state.trace().len(), 1);
        assert_eq!(state.trace()[0].budget, 5);
    }

    #[test]
    fn stops_when_budget_is_spent() {
        let model = Surface::exact(|x: &[f64]| x[0]);
        let problem = TestProblem::new(vec![0.0], -1.0, 1.0, 0);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);

        let result = init(&mut ctx, &DVector::from_vec(vec![0.0]), 0.5, 2.0);

        assert!(matches!(result, Err(Interrupt::BudgetExhausted)));
        assert_eq!(ctx.visited.len(), 0);
    }
}
