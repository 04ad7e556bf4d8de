//! Input and output checks for the profiling minimizer.
//!
//! Options are checked once when [`MinimizerOptions`](super::MinimizerOptions)
//! is built; gradients and results are checked on every run so that a
//! misbehaving model surfaces as an [`OptError`] instead of a poisoned
//! parameter vector.
use crate::optimization::{
    errors::{OptError, OptResult},
    profile_minimizer::types::{Grad, Theta},
};

fn positive_finite(x: f64) -> Result<(), &'static str> {
    if !x.is_finite() {
        Err("Tolerance must be finite.")
    } else if x <= 0.0 {
        Err("Tolerance must be positive.")
    } else {
        Ok(())
    }
}

/// Check the optional gradient-norm and cost-change tolerances.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] or [`OptError::InvalidTolCost`] for a
/// provided tolerance that is non-finite or not positive.
pub fn check_tolerances(tol_grad: Option<f64>, tol_cost: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol_cost {
        positive_finite(tol).map_err(|reason| OptError::InvalidTolCost { tol, reason })?;
    }
    if let Some(tol) = tol_grad {
        positive_finite(tol).map_err(|reason| OptError::InvalidTolGrad { tol, reason })?;
    }
    Ok(())
}

/// Gradient of the expected length with finite entries.
pub fn check_gradient(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|g| !g.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best free-parameter vector, rejecting non-finite entries.
pub fn finite_estimate(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "Profiled parameters must be finite.",
        });
    }
    Ok(theta)
}

pub fn finite_cost(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}
