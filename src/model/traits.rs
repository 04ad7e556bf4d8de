//! The objective seam: user models implement [`NegLogLikelihood`].
//!
//! Convention: the scan engine *minimizes* the negative log-likelihood
//! `N(θ) = -ℓ(θ)` directly. If an analytic gradient is supplied it must be the
//! gradient of `N` with respect to the full parameter vector (every parameter,
//! constant or not, in [`ParameterSet`](crate::model::ParameterSet) order).
use crate::optimization::{
    errors::{OptError, OptResult},
    profile_minimizer::{Grad, Theta},
};

/// User-implemented negative log-likelihood.
///
/// - `type Data`: observations or other payload carried into every call.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<f64>`: evaluate `N(θ)`. Invalid
///   regions of parameter space should return an `Err` (or a non-finite
///   value); the evaluator records these as evaluation errors.
///
/// Optional:
/// - `check(&Theta, &Data) -> OptResult<()>`: reject an unusable starting
///   point before the global fit. Defaults to accepting everything.
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic `∇N(θ)`. When absent,
///   the minimizer falls back to finite differences.
pub trait NegLogLikelihood {
    type Data;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64>;

    fn check(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        Ok(())
    }

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}
