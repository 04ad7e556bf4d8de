//! statistics — χ² conversions between objective differences and
//! probabilities.
//!
//! The scan engine reports every point as a `deltaNLL` together with the
//! probability `P(χ²_dof ≥ 2·deltaNLL)`, and turns confidence levels into
//! objective thresholds through the inverse of the same survival function.

pub mod chi_squared;

pub use self::chi_squared::{
    INVALID_DELTA_NLL, ONE_SIGMA_CL, chi2_quantile_upper, chi2_survival, crossing_threshold,
    p_value,
};
