//! optimization — profiling minimizer and unified optimizer error surface.
//!
//! Purpose
//! -------
//! Provide the local-minimization layer the scan engine relies on: an
//! argmin-backed L-BFGS minimizer over the free parameters of a model
//! ([`profile_minimizer`]) and a single error/result surface
//! ([`errors::OptError`], [`errors::OptResult`]).
//!
//! Conventions
//! -----------
//! - Objectives are negative log-likelihoods and are minimized directly.
//! - Parameters and gradients are `ndarray` vectors (`Theta`, `Grad`).
//! - Raw argmin errors never cross this module's boundary; they are
//!   converted into `OptError`.
//! - Fallible entry points return `OptResult<T>`. The [`LocalMinimizer`]
//!   seam itself reports success as a `bool` and logs failures through
//!   `tracing`.
//!
//! [`LocalMinimizer`]: profile_minimizer::LocalMinimizer

pub mod errors;
pub mod profile_minimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::profile_minimizer::{
        LineSearcher, LocalMinimizer, MinimizerMode, MinimizerOptions, MinimizerOutcome,
        ProfileMinimizer, Theta, Tolerances,
    };
}
