//! Drive an argmin solver over a [`ProfileProblem`] and normalize the final
//! state into a [`MinimizerOutcome`].
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient, observers::ObserverMode};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;
use tracing::trace;

use crate::model::NegLogLikelihood;
use crate::optimization::{
    errors::OptResult,
    profile_minimizer::{
        adapter::ProfileProblem,
        traits::{MinimizerOptions, MinimizerOutcome},
        types::{Grad, Theta},
    },
};

type ProfileState = IterState<Theta, Grad, (), (), (), f64>;

/// Minimize `problem` from the free-parameter vector `start`.
///
/// `opts.tols.max_iter` caps the executor. With the `obs_slog` feature and
/// `opts.verbose`, the starting objective is logged and a terminal observer
/// follows every iteration.
///
/// # Errors
/// - argmin runtime errors (line-search breakdown, model failures).
/// - A missing or non-finite best point or objective.
pub fn solve<'a, M, S>(
    start: Theta, opts: &MinimizerOptions, problem: ProfileProblem<'a, M>, solver: S,
) -> OptResult<MinimizerOutcome>
where
    M: NegLogLikelihood,
    S: Solver<ProfileProblem<'a, M>, ProfileState> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        announce(&start, &problem)?;
    }
    let free = start.len();
    let cap = opts.tols.max_iter.map(|n| n as u64);
    let executor = Executor::new(problem, solver).configure(|state| {
        let state = state.param(start);
        match cap {
            Some(n) => state.max_iters(n),
            None => state,
        }
    });
    #[cfg(feature = "obs_slog")]
    let executor = if opts.verbose {
        executor.add_observer(argmin_observer_slog::SlogLogger::term_noblock(), ObserverMode::Always)
    } else {
        executor
    };

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let grad = state.take_gradient();
    trace!(free, iterations, cost = state.get_best_cost(), "profile solve finished");
    MinimizerOutcome::new(
        state.take_best_param(),
        state.get_best_cost(),
        state.get_termination_status().clone(),
        iterations,
        state.get_func_counts(),
        grad,
    )
}

#[cfg(feature = "obs_slog")]
fn announce<M: NegLogLikelihood>(start: &Theta, problem: &ProfileProblem<'_, M>) -> OptResult<()> {
    let nll = problem.cost(start)?;
    let grad_norm = problem.gradient(start).ok().map(|g| g.l2_norm());
    tracing::info!(nll, grad_norm, free = start.len(), "profile fit start");
    Ok(())
}
