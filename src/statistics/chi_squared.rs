//! χ² survival function and upper-tail quantiles.
//!
//! Purpose
//! -------
//! Thin wrappers over `statrs`' [`ChiSquared`] distribution tailored to the
//! scan engine's conventions.
//!
//! Conventions
//! -----------
//! - `dof` is the number of degrees of freedom as a count; a zero count has no
//!   distribution and yields `NaN`.
//! - A non-positive statistic has survival probability 1 (the best fit
//!   itself, or a point that numerically undershoots it).
//! - Upper-tail quantiles are polished with Newton steps on the CDF, since the
//!   bisection behind `statrs`' generic `inverse_cdf` stops well short of
//!   double precision.
use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF};

/// Sentinel `deltaNLL` committed for points whose evaluation failed.
pub const INVALID_DELTA_NLL: f64 = 9999.0;

/// Two-sided probability content of ±1σ for a normal distribution.
pub const ONE_SIGMA_CL: f64 = 0.682_689_492_137_086;

const NEWTON_MAX_STEPS: usize = 50;
const NEWTON_REL_TOL: f64 = 1e-13;

fn distribution(dof: usize) -> Option<ChiSquared> {
    if dof == 0 {
        return None;
    }
    ChiSquared::new(dof as f64).ok()
}

/// `P(χ²_dof ≥ x)`.
pub fn chi2_survival(x: f64, dof: usize) -> f64 {
    let Some(chi2) = distribution(dof) else {
        return f64::NAN;
    };
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    chi2.sf(x)
}

/// The `x` with `P(χ²_dof ≥ x) = p`, for `p ∈ (0, 1)`.
///
/// Returns `0` for `p >= 1`, `+∞` for `p <= 0`, and `NaN` for a NaN `p` or a
/// zero `dof`.
pub fn chi2_quantile_upper(p: f64, dof: usize) -> f64 {
    let Some(chi2) = distribution(dof) else {
        return f64::NAN;
    };
    if p.is_nan() {
        return f64::NAN;
    }
    if p >= 1.0 {
        return 0.0;
    }
    if p <= 0.0 {
        return f64::INFINITY;
    }
    let target = 1.0 - p;
    let mut x = chi2.inverse_cdf(target);
    if !x.is_finite() || x <= 0.0 {
        x = dof as f64;
    }
    for _ in 0..NEWTON_MAX_STEPS {
        let density = chi2.pdf(x);
        if !(density.is_finite() && density > 0.0) {
            break;
        }
        let step = (chi2.cdf(x) - target) / density;
        let mut next = x - step;
        if next <= 0.0 {
            next = 0.5 * x;
        }
        let converged = (next - x).abs() <= NEWTON_REL_TOL * x.max(1.0);
        x = next;
        if converged {
            break;
        }
    }
    x
}

/// Probability reported for a point at `delta_nll` above the best fit.
pub fn p_value(delta_nll: f64, dof: usize) -> f64 {
    chi2_survival(2.0 * delta_nll, dof)
}

/// Objective value at which a profile leaves the `cl` confidence region.
pub fn crossing_threshold(nll0: f64, cl: f64, dof: usize) -> f64 {
    nll0 + 0.5 * chi2_quantile_upper(1.0 - cl, dof)
}
