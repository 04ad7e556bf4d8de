//! model — parameters, snapshots, and the objective seam.
//!
//! Purpose
//! -------
//! Describe the state a likelihood scan manipulates: a set of named, bounded
//! parameters with constant flags ([`ParameterSet`]), immutable copies of that
//! state ([`ParameterSnapshot`]) with scoped restoration ([`ParameterGuard`]),
//! and the user-implemented objective ([`NegLogLikelihood`]) bound to the
//! parameters by an [`NllEvaluator`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Exactly one scan mutates a given evaluator at a time; the borrow checker
//!   enforces this through `&mut` access.
//! - How the objective is built is entirely up to the implementor of
//!   [`NegLogLikelihood`]; this module only evaluates it.
//!
//! Downstream usage
//! ----------------
//! - Build a [`ParameterSet`], wrap the model in an [`NllEvaluator`], and hand
//!   it to [`run_scan`](crate::scan::run_scan).

pub mod errors;
pub mod evaluator;
pub mod params;
pub mod snapshot;
pub mod traits;

pub use self::errors::{ModelError, ModelResult};
pub use self::evaluator::NllEvaluator;
pub use self::params::{Parameter, ParameterRole, ParameterSet};
pub use self::snapshot::{HoldsParameters, ParameterGuard, ParameterSnapshot};
pub use self::traits::NegLogLikelihood;
