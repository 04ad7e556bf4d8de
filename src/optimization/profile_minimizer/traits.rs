//! Public configuration and outcome types for the profiling minimizer.
//!
//! - [`LocalMinimizer`]: the seam scan components call to profile the
//!   non-constant parameters; [`ProfileMinimizer`](super::ProfileMinimizer)
//!   is the argmin-backed implementation.
//! - [`MinimizerOptions`] and [`Tolerances`]: solver configuration.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`MinimizerMode`]: whether the solver sees parameter bounds.
//! - [`MinimizerOutcome`]: normalized result of one solver run.
use crate::model::{NegLogLikelihood, NllEvaluator};
use crate::optimization::{
    errors::{OptError, OptResult},
    profile_minimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{check_tolerances, finite_cost, finite_estimate},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Local optimizer over the non-constant parameters of an evaluator.
///
/// Implementations move every non-constant parameter to the best point they
/// find, write it back into the evaluator's parameter set, and report
/// whether the run converged. They never fail hard: numerical trouble is
/// reported as `false` and callers decide how to recover.
pub trait LocalMinimizer<M: NegLogLikelihood> {
    fn minimize(&self, evaluator: &mut NllEvaluator<M>, mode: MinimizerMode) -> bool;
}

/// How parameter bounds are presented to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimizerMode {
    /// Trial points are clamped into the box and outward gradient
    /// components at an active bound are zeroed.
    Constrained,
    /// The solver moves freely; only the final write-back is clamped.
    Unconstrained,
}

/// Line search paired with L-BFGS.
///
/// Names parse case-insensitively and ignore `-`/`_` separators, so
/// `"MoreThuente"`, `"more-thuente"` and `"hager_zhang"` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl LineSearcher {
    pub fn name(self) -> &'static str {
        match self {
            LineSearcher::MoreThuente => "MoreThuente",
            LineSearcher::HagerZhang => "HagerZhang",
        }
    }
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String =
            s.chars().filter(|c| c.is_ascii_alphanumeric()).map(|c| c.to_ascii_lowercase()).collect();
        match key.as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "expected 'MoreThuente' or 'HagerZhang'",
            }),
        }
    }
}

/// Settings for every profiling run of a scan.
///
/// `lbfgs_mem` of `None` means [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM). `verbose` only has an
/// effect with the `obs_slog` feature, where it attaches a terminal
/// observer to each solver run.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MinimizerOptions {
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] for a zero history size.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem { mem: 0, reason: "history must hold at least one pair" });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MinimizerOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::default(),
            line_searcher: LineSearcher::default(),
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules for one profiling run.
///
/// `tol_grad` bounds the gradient norm, `tol_cost` the change in objective
/// between iterations, and `max_iter` the iteration count. Any of them may
/// be absent, but not all three.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(500) }
    }
}

impl Tolerances {
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] when every rule is absent.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for a
    ///   tolerance that is not a positive finite number.
    /// - [`OptError::InvalidMaxIter`] for a zero iteration cap.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        match (tol_grad, tol_cost, max_iter) {
            (None, None, None) => Err(OptError::NoTolerancesProvided),
            (_, _, Some(0)) => {
                Err(OptError::InvalidMaxIter { max_iter: 0, reason: "at least one iteration is required" })
            }
            _ => {
                check_tolerances(tol_grad, tol_cost)?;
                Ok(Self { tol_grad, tol_cost, max_iter })
            }
        }
    }
}

/// What one profiling run produced.
///
/// `theta_hat` is in free-subset order. `converged` is set only when argmin
/// stopped on a tolerance (or no iteration was needed); running into the
/// iteration cap leaves it `false`. `evaluations` sums argmin's cost and
/// gradient counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOutcome {
    pub theta_hat: Theta,
    pub value: Cost,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub evaluations: u64,
    pub grad_norm: Option<f64>,
}

impl MinimizerOutcome {
    /// Normalize the final solver state.
    ///
    /// # Errors
    /// A missing or non-finite best point, or a non-finite objective.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        counts: &FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = finite_estimate(theta_hat)?;
        finite_cost(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "not terminated".to_string()),
            TerminationStatus::Terminated(reason) => (
                matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                ),
                format!("{reason:?}"),
            ),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            evaluations: counts.values().sum(),
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }

    /// A start point that needed no iteration.
    pub fn at_start(theta: Theta, value: f64, grad_norm: Option<f64>) -> Self {
        Self {
            theta_hat: theta,
            value,
            converged: true,
            status: "start already optimal".to_string(),
            iterations: 0,
            evaluations: 0,
            grad_norm,
        }
    }
}
