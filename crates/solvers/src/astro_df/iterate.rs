use nalgebra::DVector;
use tracing::debug;

use astrolabe_core::{SimulationProblem, StochasticModel};

use super::{
    basis::BOUND_MARGIN,
    construct::construct,
    context::Context,
    error::Interrupt,
    event::Outcome,
    state::TrustRegionState,
    step::solve_subproblem,
};

/// A node must beat the candidate by this multiple of `δ²` to replace it.
const PATTERN_SEARCH_MARGIN: f64 = 0.01;

/// What one iteration did.
#[derive(Debug, Clone, Copy)]
pub(super) struct Report {
    pub(super) outcome: Outcome,
    pub(super) rho: f64,

    /// The radius the step was taken with, after the criticality loop.
    pub(super) step_radius: f64,

    /// Oriented objective of the incumbent after the iteration.
    pub(super) objective: f64,
}

/// Runs one trust-region iteration from `state`.
///
/// The local model is built, its subproblem solved, and the candidate
/// sampled. If an interpolation node already beats the candidate clearly,
/// that node is taken instead. The incumbent and radius are then updated
/// from the success ratio.
pub(super) fn iterate<M, P>(
    ctx: &mut Context<'_, M, P>,
    state: &mut TrustRegionState,
) -> Result<Report, Interrupt>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let config = ctx.config;
    let k = state.k;
    let built = construct(ctx, state)?;
    let radius = built.radius;
    let center = ctx.position(state.center);

    let step = solve_subproblem(&built.model, radius, config.simple_solve());
    let mut candidate = &center + &step;
    ctx.bounds().clip_inward(candidate.as_mut_slice(), BOUND_MARGIN);

    let pilot = if k == 1 {
        ctx.sampler.initial_pilot()
    } else {
        let estimate = built
            .variance
            .as_ref()
            .map(|m| m.value(&(&candidate - &center)));
        ctx.sampler.guided_pilot(
            estimate,
            ctx.variance(state.center),
            k,
            radius,
            state.kappa,
        )
    };
    let candidate_id = ctx.spawn(&candidate, pilot)?;
    ctx.top_up(candidate_id, k, radius, state.kappa)?;
    let candidate_value = ctx.objective(candidate_id);

    let (accepted, accepted_value) = match pattern_search(&built.values, candidate_value, radius) {
        Some(index) => {
            debug!(k, node = index, "interpolation node beats candidate");
            (built.members[index], built.values[index])
        }
        None => (candidate_id, candidate_value),
    };

    let offset = ctx.position(accepted) - &center;
    let predicted = built.model.value(&DVector::zeros(center.len())) - built.model.value(&offset);
    let rho = if predicted <= 0.0 {
        0.0
    } else {
        (built.values[0] - accepted_value) / predicted
    };

    let outcome = Outcome::classify(rho, config.eta_1(), config.eta_2());
    state.radius = match outcome {
        Outcome::VerySuccessful => config.gamma_1() * radius,
        Outcome::Successful => radius,
        Outcome::Unsuccessful => config.gamma_2() * radius,
    }
    .min(state.max_radius);

    let objective = if outcome.is_accepted() {
        state.accept(accepted, ctx.budget.expended());
        accepted_value
    } else {
        built.values[0]
    };

    Ok(Report {
        outcome,
        rho,
        step_radius: radius,
        objective,
    })
}

/// Returns the index of the best interpolation node if the candidate's
/// estimate exceeds it by more than `0.01·δ²`.
pub(super) fn pattern_search(values: &[f64], candidate_value: f64, radius: f64) -> Option<usize> {
    let (index, &best) = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    (candidate_value - best > PATTERN_SEARCH_MARGIN * radius.powi(2)).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::astro_df::{
        Config,
        init::init,
        test_utils::{Surface, TestProblem},
    };

    #[test]
    fn pattern_search_needs_a_clear_margin() {
        let values = [1.0, 0.5, 0.7];
        assert_eq!(pattern_search(&values, 0.505, 1.0), None);
        assert_eq!(pattern_search(&values, 0.52, 1.0), Some(1));
        assert_eq!(pattern_search(&values, 0.52, 0.1), Some(1));
        assert_eq!(pattern_search(&[], 0.0, 1.0), None);
    }

    #[test]
    fn pattern_search_prefers_first_of_equal_nodes() {
        assert_eq!(pattern_search(&[0.0, -1.0, -1.0], 0.0, 1.0), Some(1));
    }

    #[test]
    fn node_beating_candidate_is_adopted() {
        // Linear along the axes, so the model points diagonally, but the
        // coupling term makes the diagonal candidate far worse than a node.
        let model = Surface::exact(|x: &[f64]| x[0] + x[1] + 100.0 * (x[0] * x[1]).powi(2));
        let problem = TestProblem::new(vec![0.0, 0.0], -2.0, 2.0, 10_000);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);
        let x0 = DVector::from_vec(vec![0.0, 0.0]);

        let mut state = init(&mut ctx, &x0, 0.5, 4.0).unwrap();
        let report = iterate(&mut ctx, &mut state).unwrap();

        assert_eq!(report.outcome, Outcome::VerySuccessful);
        assert_relative_eq!(report.rho, 1.0, epsilon = 1e-9);
        assert_relative_eq!(
            ctx.position(state.center),
            DVector::from_vec(vec![-0.5, 0.0])
        );
        assert_relative_eq!(ctx.objective(state.center), -0.5, epsilon = 1e-12);
        assert_relative_eq!(report.objective, -0.5, epsilon = 1e-12);
        assert_relative_eq!(state.radius, 0.75);
        assert_eq!(state.trace().len(), 2);
    }

    #[test]
    fn radius_stays_within_bounds_after_iterations() {
        let model = Surface::noisy(|x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2), 0.1);
        let problem = TestProblem::new(vec![0.0, 0.0], -5.0, 5.0, 20_000);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);
        let x0 = DVector::from_vec(vec![0.0, 0.0]);

        let mut state = init(&mut ctx, &x0, 1.0, 2.0).unwrap();
        for _ in 0..6 {
            let report = iterate(&mut ctx, &mut state).unwrap();

            assert!(state.radius > 0.0 && state.radius <= state.max_radius);
            if report.outcome == Outcome::VerySuccessful {
                assert!(state.radius >= report.step_radius.min(state.max_radius));
            }
            state.k += 1;
        }
    }

    #[test]
    fn unsuccessful_iterations_keep_the_incumbent() {
        // A gentle slope along the axes with a bump on the diagonal: the
        // candidate is worse than the center, yet not by enough to trigger
        // the pattern-search override.
        let model = Surface::exact(|x: &[f64]| 0.002 * (x[0] + x[1]) + 0.1 * (x[0] * x[1]).powi(2));
        let problem = TestProblem::new(vec![0.0, 0.0], -5.0, 5.0, 10_000);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);
        let x0 = DVector::from_vec(vec![0.0, 0.0]);

        let mut state = init(&mut ctx, &x0, 0.5, 2.0).unwrap();
        let center = state.center;
        let report = iterate(&mut ctx, &mut state).unwrap();

        assert_eq!(report.outcome, Outcome::Unsuccessful);
        assert!(report.rho < 0.0);
        assert_eq!(state.center, center);
        assert_relative_eq!(state.radius, 0.375);
        assert_relative_eq!(report.objective, 0.0);
        assert_eq!(state.trace().len(), 1);
    }
}
