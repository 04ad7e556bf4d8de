//! profile_minimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and L-BFGS aliases used by the profiling
//! minimizer so the rest of the crate stays agnostic to `ndarray` and argmin
//! generics.
//!
//! Conventions
//! -----------
//! - `Theta` is used both for the full model parameter vector and for the
//!   reduced vector of free parameters the solver actually moves; which one
//!   is meant is always clear from the call site.
//! - `Cost` is the negative log-likelihood itself; no sign flips happen
//!   anywhere in this crate.
use argmin::solver::linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector `∇N(θ)`, same shape as `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value (negative log-likelihood).
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
