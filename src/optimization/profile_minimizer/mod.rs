//! profile_minimizer — argmin-backed local minimization over free parameters.
//!
//! Purpose
//! -------
//! Profile a negative log-likelihood: minimize it over every non-constant
//! parameter of an [`NllEvaluator`](crate::model::NllEvaluator) while the
//! constant ones stay put. Scan components only see the [`LocalMinimizer`]
//! seam; [`ProfileMinimizer`] is the L-BFGS implementation.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ProfileProblem`] exposes the free subset of the parameter
//!   vector to argmin, embedding trial points into the full vector and
//!   (in [`MinimizerMode::Constrained`]) clamping them to bounds.
//! - Analytic gradients are used when the model provides them; otherwise
//!   central then forward finite differences of the cost.
//! - [`builders::lbfgs`] constructs L-BFGS for either line search;
//!   [`run::solve`] executes it and normalizes the result into a
//!   [`MinimizerOutcome`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The cost is `N(θ)` itself; nothing in this module flips signs.
//! - Convergence means argmin reported `SolverConverged` or
//!   `TargetCostReached`; hitting `max_iter` is *not* convergence.
//! - After a successful run every free parameter holds the best point found,
//!   clamped to its bounds.
//!
//! Testing notes
//! -------------
//! - Unit tests cover embedding and projection in [`adapter`], builder
//!   wiring, option validation in [`traits`], and end-to-end minimization of
//!   small quadratics in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::ProfileMinimizer;
pub use self::traits::{
    LineSearcher, LocalMinimizer, MinimizerMode, MinimizerOptions, MinimizerOutcome, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};
