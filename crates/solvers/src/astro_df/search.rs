use nalgebra::DVector;
use tracing::{debug, info};

use astrolabe_core::{Observer, SimulationProblem, StochasticModel};

use super::{
    Action, Config, Error, Event, Solution, Status,
    bootstrap::{SEED_FRACTIONS, max_radius},
    context::Context,
    error::Interrupt,
    init::init,
    iterate::{Report, iterate},
    solution::Recommendation,
    state::TrustRegionState,
};

/// A bootstrap seed that completed its single iteration.
struct Seed {
    state: TrustRegionState,
    objective: f64,
    start: u64,
    spent: u64,
}

/// Core ASTRO-DF search.
///
/// Runs one iteration from the initial solution for each seed radius, keeps
/// the seed with the best final objective, then iterates from it until the
/// budget runs out or the observer stops the search.
pub(super) fn search<M, P, Obs>(
    model: &M,
    problem: &P,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let dim = problem.dim();
    let x0 = problem.initial_solution();
    if x0.len() != dim {
        return Err(Error::Dimension {
            expected: dim,
            found: x0.len(),
        });
    }
    let x0 = DVector::from_vec(x0);

    let max_radius = max_radius(problem, config)?;
    info!(dim, budget = problem.budget(), max_radius, "starting ASTRO-DF search");

    let mut ctx = Context::new(model, problem, config);
    let mut best: Option<Seed> = None;
    let mut status = None;

    for fraction in SEED_FRACTIONS {
        let seed_radius = fraction * max_radius;
        let start = ctx.budget.expended();
        let (state, report) = match run_seed(&mut ctx, &x0, seed_radius, max_radius) {
            Ok(run) => run,
            Err(Interrupt::BudgetExhausted) => {
                status = Some(Status::BudgetExhausted);
                break;
            }
            Err(Interrupt::Failed(e)) => return Err(e),
        };
        let spent = ctx.budget.expended() - start;
        debug!(seed_radius, objective = report.objective, spent, "bootstrap seed finished");

        let event = Event::Bootstrapped {
            seed_radius,
            objective: report.objective,
            spent,
        };
        let action = observer.observe(&event);

        if best.as_ref().is_none_or(|b| report.objective < b.objective) {
            best = Some(Seed {
                state,
                objective: report.objective,
                start,
                spent,
            });
        }

        if let Some(Action::StopEarly) = action {
            status = Some(Status::StoppedByObserver);
            break;
        }
    }

    let Some(seed) = best else {
        info!(expended = ctx.budget.expended(), "budget exhausted during bootstrap");
        return Ok(Solution {
            status: Status::BootstrapExhausted,
            recommended: Vec::new(),
            expended_budget: ctx.budget.expended(),
            simulate_calls: ctx.budget.calls(),
            iters: 0,
            max_radius,
            radius: 0.0,
        });
    };

    let mut state = seed.state;
    let offset = ctx.budget.expended() - seed.spent;
    state.rebase(seed.start, offset);

    let status = match status {
        Some(status) => status,
        None => main_loop(&mut ctx, &mut state, &mut observer)?,
    };

    state.close(ctx.budget.expended());
    info!(
        ?status,
        iters = state.k,
        expended = ctx.budget.expended(),
        points = ctx.visited.len(),
        "ASTRO-DF search finished"
    );

    Ok(into_solution(&ctx, &state, status))
}

fn run_seed<M, P>(
    ctx: &mut Context<'_, M, P>,
    x0: &DVector<f64>,
    radius: f64,
    max_radius: f64,
) -> Result<(TrustRegionState, Report), Interrupt>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let mut state = init(ctx, x0, radius, max_radius)?;
    let report = iterate(ctx, &mut state)?;
    Ok((state, report))
}

fn main_loop<M, P, Obs>(
    ctx: &mut Context<'_, M, P>,
    state: &mut TrustRegionState,
    observer: &mut Obs,
) -> Result<Status, Error>
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    while !ctx.budget.is_exhausted() {
        state.k += 1;
        let report = match iterate(ctx, state) {
            Ok(report) => report,
            Err(Interrupt::BudgetExhausted) => break,
            Err(Interrupt::Failed(e)) => return Err(e),
        };
        debug!(
            k = state.k,
            step_radius = report.step_radius,
            radius = state.radius,
            rho = report.rho,
            outcome = ?report.outcome,
            expended = ctx.budget.expended(),
            "iteration finished"
        );

        let incumbent = ctx.visited.get(state.center).x();
        let event = Event::Iterated {
            k: state.k,
            radius: state.radius,
            rho: report.rho,
            outcome: report.outcome,
            incumbent,
            objective: report.objective,
            expended_budget: ctx.budget.expended(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Status::StoppedByObserver);
        }
    }
    Ok(Status::BudgetExhausted)
}

fn into_solution<M, P>(
    ctx: &Context<'_, M, P>,
    state: &TrustRegionState,
    status: Status,
) -> Solution
where
    M: StochasticModel,
    P: SimulationProblem<Input = M::Input, Output = M::Output>,
{
    let recommended = state
        .trace()
        .iter()
        .map(|checkpoint| {
            let point = ctx.visited.get(checkpoint.point);
            Recommendation {
                x: point.x().to_vec(),
                objective: point.mean(),
                n_reps: point.n_reps(),
                budget: checkpoint.budget,
            }
        })
        .collect();

    Solution {
        status,
        recommended,
        expended_budget: ctx.budget.expended(),
        simulate_calls: ctx.budget.calls(),
        iters: state.k,
        max_radius: state.max_radius,
        radius: state.radius,
    }
}
