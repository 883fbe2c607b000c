use nalgebra::DVector;
use tracing::{debug, warn};

use astrolabe_core::{Bounds, SimulationProblem, StochasticModel};

use super::{
    basis::{BOUND_MARGIN, InterpolationSet},
    context::Context,
    error::Interrupt,
    placement::{Placement, VarianceOutcome, decide},
    state::TrustRegionState,
    step::cauchy_step,
    surrogate::{Conditioning, LocalModel, VarianceFit, fit_variance},
    visited::PointId,
};

/// A variance minimizer this close to the reused point adds no information.
const MINIMIZER_SEPARATION: f64 = 0.2;

/// A local model together with the points it was built from.
#[derive(Debug, Clone)]
pub(super) struct Construction {
    /// The point behind each node, center first.
    pub(super) members: Vec<PointId>,

    /// Oriented objective estimates at each node.
    pub(super) values: Vec<f64>,

    pub(super) model: LocalModel,

    /// The variance surrogate, when one could be fit.
    pub(super) variance: Option<LocalModel>,

    /// The radius the step should use.
    pub(super) radius: f64,
}

/// Builds a local model around the incumbent, shrinking the sampling radius
/// until the model's gradient is large relative to it.
pub(super) fn construct<M, P>(
    ctx: &mut Context<'_, M, P>,
    state: &TrustRegionState,
) -> Result<Construction, Interrupt>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let config = ctx.config;
    let center = ctx.position(state.center);

    let mut pass = 0;
    loop {
        let radius = state.radius * config.w().powi(pass);
        pass += 1;

        let built = build(ctx, state, &center, radius)?;
        let grad_norm = built.model.gradient().norm();

        let large_gradient =
            !config.criticality_select() && grad_norm > config.criticality_threshold();
        if large_gradient || radius <= config.mu() * grad_norm || grad_norm == 0.0 {
            let radius = (config.beta() * grad_norm).max(radius).min(state.radius);
            debug!(k = state.k, passes = pass, radius, grad_norm, "local model built");
            return Ok(Construction { radius, ..built });
        }
    }
}

/// Places, samples, and fits one pass at `radius`.
fn build<M, P>(
    ctx: &mut Context<'_, M, P>,
    state: &TrustRegionState,
    center: &DVector<f64>,
    radius: f64,
) -> Result<Construction, Interrupt>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let config = ctx.config;
    let k = state.k;
    let first = k == 1;

    let reusable = if first || !config.reuse_points() {
        None
    } else {
        ctx.visited.farthest_within(center.as_slice(), radius)
    };

    let variance_fit = if first {
        None
    } else {
        Some(fit_variance_surrogate(ctx, state.center, center, radius))
    };
    let variance = match variance_fit {
        Some(VarianceFit::Usable(model)) => Some(model),
        Some(VarianceFit::Degenerate { rank }) => {
            warn!(k, rank, "variance surrogate is degenerate");
            None
        }
        None => None,
    };

    let minimizer = match &variance {
        Some(model) => variance_minimizer(ctx, center, model, radius),
        None => None,
    };
    let reused_position = reusable.map(|id| ctx.position(id));
    let outcome = if first {
        VarianceOutcome::Unavailable
    } else {
        variance_outcome(
            variance.is_some(),
            minimizer.as_ref(),
            reused_position.as_ref(),
            radius,
        )
    };

    let placement = decide(first, config.reuse_points(), reusable.is_some(), outcome);
    debug!(k, radius, ?placement, ?outcome, "placing interpolation set");

    let set = place(
        placement,
        center,
        radius,
        ctx.bounds(),
        reused_position.as_ref(),
        minimizer,
    );

    let kappa = state.kappa;
    if !first {
        ctx.top_up(state.center, k, radius, kappa)?;
    }
    let center_variance = ctx.variance(state.center);

    let mut members = Vec::with_capacity(set.len());
    members.push(state.center);
    for (index, node) in set.nodes().iter().enumerate().skip(1) {
        let id = match reusable {
            Some(reused) if set.reuses(index) => {
                ctx.top_up(reused, k, radius, kappa)?;
                reused
            }
            _ => {
                let estimate = variance.as_ref().map(|m| m.value(&(node - center)));
                let pilot = ctx
                    .sampler
                    .guided_pilot(estimate, center_variance, k, radius, kappa);
                let id = ctx.spawn(node, pilot)?;
                ctx.top_up(id, k, radius, kappa)?;
                id
            }
        };
        members.push(id);
    }

    let values: Vec<f64> = members.iter().map(|&id| ctx.objective(id)).collect();
    let fit = LocalModel::fit(&set.offsets(), &values)?;
    if let Conditioning::RankDeficient { rank } = fit.conditioning {
        warn!(k, rank, nodes = set.len(), "interpolation system is rank deficient");
    }

    Ok(Construction {
        members,
        values,
        model: fit.model,
        variance,
        radius,
    })
}

/// Classifies the variance surrogate for a pass after the first iteration.
///
/// A minimizer within `0.2·δ` of the reused point would duplicate it, so it
/// counts as degenerate.
fn variance_outcome(
    fitted: bool,
    minimizer: Option<&DVector<f64>>,
    reused: Option<&DVector<f64>>,
    radius: f64,
) -> VarianceOutcome {
    match (fitted, minimizer, reused) {
        (false, _, _) => VarianceOutcome::FitFailed,
        (true, None, _) => VarianceOutcome::MinimizerDegenerate,
        (true, Some(x), Some(r)) if (x - r).norm() < MINIMIZER_SEPARATION * radius => {
            VarianceOutcome::MinimizerDegenerate
        }
        (true, Some(_), _) => VarianceOutcome::Usable,
    }
}

/// Lays out the interpolation set for a placement decision.
///
/// A reuse placement without a reused point, or a variance placement
/// without a minimizer, falls back to the coordinate layout.
fn place(
    placement: Placement,
    center: &DVector<f64>,
    radius: f64,
    bounds: &Bounds,
    reused: Option<&DVector<f64>>,
    minimizer: Option<DVector<f64>>,
) -> InterpolationSet {
    match (placement, reused, minimizer) {
        (Placement::ReusePlain, Some(r), _) => InterpolationSet::rotated(center, radius, bounds, r),
        (Placement::ReuseWithVarianceModel, Some(r), Some(x)) => {
            let mut set = InterpolationSet::rotated(center, radius, bounds, r);
            set.replace_closest(x);
            set
        }
        _ => InterpolationSet::coordinate(center, radius, bounds),
    }
}

/// Regresses sample variances of nearby visited points on their offsets.
fn fit_variance_surrogate<M, P>(
    ctx: &Context<'_, M, P>,
    center_id: PointId,
    center: &DVector<f64>,
    radius: f64,
) -> VarianceFit
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let min_count = 2 * ctx.dim() + 2;
    let pool = ctx.visited.neighborhood(center.as_slice(), radius, min_count);

    let mut offsets = Vec::with_capacity(pool.len() + 1);
    let mut values = Vec::with_capacity(pool.len() + 1);
    offsets.push(DVector::zeros(ctx.dim()));
    values.push(ctx.variance(center_id));
    for id in pool {
        offsets.push(ctx.position(id) - center);
        values.push(ctx.variance(id));
    }

    fit_variance(&offsets, &values)
}

/// Returns where the variance surrogate predicts the least noise, or `None`
/// if it has no usable descent direction.
fn variance_minimizer<M, P>(
    ctx: &Context<'_, M, P>,
    center: &DVector<f64>,
    model: &LocalModel,
    radius: f64,
) -> Option<DVector<f64>>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let gradient = model.gradient();
    let g_norm = gradient.norm();
    if !(g_norm.is_finite() && g_norm > 0.0) {
        return None;
    }

    let mut x = center + cauchy_step(&gradient, &model.hessian(), radius);
    ctx.bounds().clip_inward(x.as_mut_slice(), BOUND_MARGIN);
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::astro_df::{
        Config,
        init::init,
        iterate::iterate,
        test_utils::{Surface, TestProblem},
    };

    fn v(xs: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(xs)
    }

    #[test]
    fn criticality_loop_shrinks_until_radius_is_below_mu_gradient() {
        let model = Surface::exact(|x: &[f64]| 1e-6 * x[0]);
        let problem = TestProblem::new(vec![0.0, 0.0], -5.0, 5.0, 10_000);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);

        let state = init(&mut ctx, &v(&[0.0, 0.0]), 1.0, 2.0).unwrap();
        let built = construct(&mut ctx, &state).unwrap();

        let g_norm = built.model.gradient().norm();
        assert_relative_eq!(g_norm, 1e-6, max_relative = 1e-6);
        assert!(built.radius <= config.mu() * g_norm);
        assert!(built.radius > config.w() * config.mu() * g_norm);

        // Every pass samples four fresh coordinate nodes around the center.
        let passes = (ctx.visited.len() - 1) / 4;
        assert_eq!(ctx.visited.len(), 1 + 4 * passes);
        assert_relative_eq!(
            built.radius,
            config.w().powi(passes as i32 - 1),
            max_relative = 1e-12
        );
    }

    #[test]
    fn final_radius_is_clamped_below_by_beta_gradient() {
        // ‖g‖ = 0.1 and μ‖g‖ = 1.1, so the fifth pass (δ = 2·0.85⁴ ≈ 1.044)
        // exits, and β‖g‖ = 1.09 lifts the radius back up.
        let model = Surface::exact(|x: &[f64]| 0.1 * x[0]);
        let problem = TestProblem::new(vec![0.0, 0.0], -5.0, 5.0, 10_000);
        let config = Config::builder()
            .with_mu(11.0)
            .with_beta(10.9)
            .build()
            .unwrap();
        let mut ctx = Context::new(&model, &problem, &config);

        let state = init(&mut ctx, &v(&[0.0, 0.0]), 2.0, 4.0).unwrap();
        let built = construct(&mut ctx, &state).unwrap();

        assert_eq!(ctx.visited.len(), 1 + 5 * 4);
        assert_relative_eq!(built.radius, 1.09, epsilon = 1e-9);
    }

    #[test]
    fn second_iteration_reuses_the_farthest_visited_point() {
        let model = Surface::exact(|x: &[f64]| x[0] + 2.0 * x[1]);
        let problem = TestProblem::new(vec![0.0, 0.0], -5.0, 5.0, 10_000);
        let config = Config::default();
        let mut ctx = Context::new(&model, &problem, &config);

        let mut state = init(&mut ctx, &v(&[0.0, 0.0]), 0.5, 4.0).unwrap();
        iterate(&mut ctx, &mut state).unwrap();
        state.k = 2;

        let center = ctx.position(state.center);
        let expected = ctx
            .visited
            .farthest_within(center.as_slice(), state.radius)
            .expect("iteration 1 left points inside the region");
        let logged = ctx.visited.len();

        let built = construct(&mut ctx, &state).unwrap();

        assert_eq!(built.members[0], state.center);
        assert_eq!(built.members[1], expected);
        assert_eq!(ctx.visited.len(), logged + 3);
        assert_relative_eq!(built.radius, state.radius);
        assert_relative_eq!(built.model.gradient(), v(&[1.0, 2.0]), epsilon = 1e-9);
    }

    #[test]
    fn disabled_reuse_samples_a_fresh_coordinate_set() {
        let model = Surface::exact(|x: &[f64]| x[0] + 2.0 * x[1]);
        let problem = TestProblem::new(vec![0.0, 0.0], -5.0, 5.0, 10_000);
        let config = Config::builder().with_reuse_points(false).build().unwrap();
        let mut ctx = Context::new(&model, &problem, &config);

        let mut state = init(&mut ctx, &v(&[0.0, 0.0]), 0.5, 4.0).unwrap();
        iterate(&mut ctx, &mut state).unwrap();
        state.k = 2;
        let logged = ctx.visited.len();

        let built = construct(&mut ctx, &state).unwrap();

        assert_eq!(ctx.visited.len(), logged + 4);
        let center = ctx.position(state.center);
        assert_relative_eq!(
            ctx.position(built.members[1]),
            &center + v(&[built.radius, 0.0]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn variance_outcome_flags_redundant_minimizers() {
        let reused = v(&[0.6, 0.0]);

        assert_eq!(
            variance_outcome(false, None, Some(&reused), 1.0),
            VarianceOutcome::FitFailed
        );
        assert_eq!(
            variance_outcome(true, None, Some(&reused), 1.0),
            VarianceOutcome::MinimizerDegenerate
        );
        assert_eq!(
            variance_outcome(true, Some(&v(&[0.7, 0.0])), Some(&reused), 1.0),
            VarianceOutcome::MinimizerDegenerate
        );
        assert_eq!(
            variance_outcome(true, Some(&v(&[0.0, -0.9])), Some(&reused), 1.0),
            VarianceOutcome::Usable
        );
        assert_eq!(
            variance_outcome(true, Some(&v(&[0.7, 0.0])), None, 1.0),
            VarianceOutcome::Usable
        );
    }

    #[test]
    fn plain_reuse_keeps_the_visited_point_as_first_node() {
        let bounds = Bounds::unbounded(2);
        let reused = v(&[0.6, 0.0]);

        let set = place(
            Placement::ReusePlain,
            &v(&[0.0, 0.0]),
            1.0,
            &bounds,
            Some(&reused),
            None,
        );

        assert_eq!(set.len(), 5);
        assert!(set.reuses(1));
        assert_relative_eq!(set.nodes()[1], reused);
        assert_relative_eq!(set.nodes()[2], v(&[-1.0, 0.0]), epsilon = 1e-12);
    }

    #[test]
    fn variance_minimizer_replaces_the_closest_node() {
        let bounds = Bounds::unbounded(2);
        let center = v(&[0.0, 0.0]);
        let reused = v(&[0.6, 0.0]);

        let set = place(
            Placement::ReuseWithVarianceModel,
            &center,
            1.0,
            &bounds,
            Some(&reused),
            Some(v(&[0.0, -0.9])),
        );
        assert!(set.reuses(1));
        assert_relative_eq!(set.nodes()[4], v(&[0.0, -0.9]));

        // A minimizer next to the reused point displaces it.
        let set = place(
            Placement::ReuseWithVarianceModel,
            &center,
            1.0,
            &bounds,
            Some(&reused),
            Some(v(&[0.5, 0.05])),
        );
        assert!(!set.reuses(1));
        assert_relative_eq!(set.nodes()[1], v(&[0.5, 0.05]));
    }

    #[test]
    fn failed_variance_fit_falls_back_to_coordinate_nodes() {
        let bounds = Bounds::unbounded(2);
        let reused = v(&[0.6, 0.0]);
        let placement = decide(false, true, true, VarianceOutcome::FitFailed);

        let set = place(
            placement,
            &v(&[0.0, 0.0]),
            1.0,
            &bounds,
            Some(&reused),
            Some(v(&[0.0, 0.5])),
        );

        assert!(!set.reuses(1));
        assert_relative_eq!(set.nodes()[1], v(&[1.0, 0.0]), epsilon = 1e-12);
        assert_relative_eq!(set.nodes()[3], v(&[0.0, 1.0]), epsilon = 1e-12);
    }
}
