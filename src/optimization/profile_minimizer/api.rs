//! High-level entry point for profiling an [`NllEvaluator`].
//!
//! [`ProfileMinimizer::minimize_profile`] wraps the evaluator's model and
//! non-constant parameters in a [`ProfileProblem`], selects an L-BFGS solver
//! with the configured line search, runs it, and writes the best point back
//! into the evaluator's parameter set.
use tracing::{debug, warn};

use crate::model::{NegLogLikelihood, NllEvaluator};
use crate::optimization::{
    errors::OptResult,
    profile_minimizer::{
        adapter::ProfileProblem,
        builders::lbfgs,
        run::solve,
        traits::{LineSearcher, LocalMinimizer, MinimizerMode, MinimizerOptions, MinimizerOutcome},
        types::{HagerZhangLS, MoreThuenteLS, Theta},
    },
};
use argmin::core::{CostFunction, Gradient};
use argmin_math::ArgminL2Norm;

/// Argmin-backed [`LocalMinimizer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileMinimizer {
    opts: MinimizerOptions,
}

impl ProfileMinimizer {
    pub fn new(opts: MinimizerOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &MinimizerOptions {
        &self.opts
    }

    /// Minimize `N` over the non-constant parameters of `evaluator`.
    ///
    /// # Behavior
    /// - With no free parameters the objective is evaluated once and the run
    ///   counts as converged.
    /// - If the projected gradient at the start already satisfies
    ///   `tol_grad`, no solver iteration is run.
    /// - Otherwise L-BFGS runs from the current values. On success the best
    ///   point is written back (clamped to bounds) whether or not the solver
    ///   converged; on error the parameter set is left untouched.
    ///
    /// # Errors
    /// - Model errors or a non-finite objective at the start point.
    /// - Solver construction or runtime errors.
    pub fn minimize_profile<M: NegLogLikelihood>(
        &self, evaluator: &mut NllEvaluator<M>, mode: MinimizerMode,
    ) -> OptResult<MinimizerOutcome> {
        let outcome = {
            let problem =
                ProfileProblem::new(evaluator.model(), evaluator.data(), evaluator.parameters(), mode);
            let x0 = problem.start();
            if x0.is_empty() {
                let value = problem.cost(&x0)?;
                return Ok(MinimizerOutcome::at_start(Theta::zeros(0), value, None));
            }
            let value0 = problem.cost(&x0)?;
            let grad_norm0 = problem.gradient(&x0).ok().map(|g| g.l2_norm());
            if let (Some(norm), Some(tol)) = (grad_norm0, self.opts.tols.tol_grad) {
                if norm <= tol {
                    return Ok(MinimizerOutcome::at_start(x0, value0, grad_norm0));
                }
            }
            match self.opts.line_searcher {
                LineSearcher::MoreThuente => {
                    solve(x0, &self.opts, problem, lbfgs(MoreThuenteLS::new(), &self.opts)?)?
                }
                LineSearcher::HagerZhang => {
                    solve(x0, &self.opts, problem, lbfgs(HagerZhangLS::new(), &self.opts)?)?
                }
            }
        };
        let free = evaluator.parameters().free_indices();
        let params = evaluator.parameters_mut();
        for (k, &i) in free.iter().enumerate() {
            params.set_value(i, outcome.theta_hat[k]);
        }
        Ok(outcome)
    }
}

impl<M: NegLogLikelihood> LocalMinimizer<M> for ProfileMinimizer {
    fn minimize(&self, evaluator: &mut NllEvaluator<M>, mode: MinimizerMode) -> bool {
        match self.minimize_profile(evaluator, mode) {
            Ok(outcome) => {
                if !outcome.converged {
                    debug!(status = %outcome.status, iterations = outcome.iterations, "profile fit did not converge");
                }
                outcome.converged
            }
            Err(err) => {
                warn!(%err, "profile fit failed");
                false
            }
        }
    }
}
