//! Adapter that exposes a profiled [`NegLogLikelihood`] as an `argmin` problem.
//!
//! The solver only sees the *free* parameters. Every trial vector is embedded
//! back into the full parameter vector (constant parameters keep their
//! template values) before the model is called. In
//! [`MinimizerMode::Constrained`] the embedded values are clamped into the
//! parameter bounds and gradient components that push outward at an active
//! bound are zeroed, so the solver cannot walk out of the box.
use std::cell::RefCell;

use crate::model::{NegLogLikelihood, ParameterSet};
use crate::optimization::{
    errors::{OptError, OptResult},
    profile_minimizer::{
        traits::MinimizerMode,
        types::{Cost, Grad, Theta},
        validation::check_gradient,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Distance to a bound below which a component counts as sitting on it.
const BOUND_EPS: f64 = 1e-12;

/// Bridges a model, its data, and the free subset of a parameter set to
/// `argmin`'s `CostFunction` and `Gradient`.
pub struct ProfileProblem<'a, M: NegLogLikelihood> {
    model: &'a M,
    data: &'a M::Data,
    template: Theta,
    free: Vec<usize>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    mode: MinimizerMode,
}

impl<'a, M: NegLogLikelihood> ProfileProblem<'a, M> {
    /// Build a problem over the non-constant parameters of `params`.
    pub fn new(
        model: &'a M, data: &'a M::Data, params: &ParameterSet, mode: MinimizerMode,
    ) -> Self {
        let free = params.free_indices();
        let (lower, upper) = free
            .iter()
            .filter_map(|&i| params.get(i))
            .map(|p| (p.lower, p.upper))
            .unzip();
        Self { model, data, template: params.values(), free, lower, upper, mode }
    }

    /// Indices (in the full parameter vector) of the parameters the solver moves.
    pub fn free_indices(&self) -> &[usize] {
        &self.free
    }

    /// Current values of the free parameters.
    pub fn start(&self) -> Theta {
        Theta::from_iter(self.free.iter().map(|&i| self.template[i]))
    }

    /// Map a free-parameter vector into the full parameter vector.
    ///
    /// # Errors
    /// - [`OptError::ThetaLengthMismatch`] if `x` has the wrong length.
    pub fn embed(&self, x: &Theta) -> OptResult<Theta> {
        if x.len() != self.free.len() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.free.len(),
                found: x.len(),
            });
        }
        let mut full = self.template.clone();
        for (k, &i) in self.free.iter().enumerate() {
            full[i] = match self.mode {
                MinimizerMode::Constrained => x[k].clamp(self.lower[k], self.upper[k]),
                MinimizerMode::Unconstrained => x[k],
            };
        }
        Ok(full)
    }

    /// Zero the components that push outward from an active bound.
    fn project(&self, x: &Theta, grad: &mut Grad) {
        if self.mode == MinimizerMode::Unconstrained {
            return;
        }
        for k in 0..grad.len() {
            let at_lower = x[k] <= self.lower[k] + BOUND_EPS;
            let at_upper = x[k] >= self.upper[k] - BOUND_EPS;
            if (at_lower && grad[k] > 0.0) || (at_upper && grad[k] < 0.0) {
                grad[k] = 0.0;
            }
        }
    }
}

impl<'a, M: NegLogLikelihood> CostFunction for ProfileProblem<'a, M> {
    type Param = Theta;
    type Output = Cost;

    /// `N` at the embedded point; a non-finite value is an error.
    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        let nll = self.model.value(&self.embed(x)?, self.data)?;
        if nll.is_finite() { Ok(nll) } else { Err(OptError::NonFiniteCost { value: nll }.into()) }
    }
}

impl<'a, M: NegLogLikelihood> Gradient for ProfileProblem<'a, M> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of `N` with respect to the free parameters.
    ///
    /// - An analytic model gradient is validated against the full dimension
    ///   and restricted to the free indices.
    /// - Otherwise central differences of the cost are tried first; if a cost
    ///   evaluation failed or the result is non-finite, forward differences
    ///   are used instead.
    /// - In constrained mode the result is projected at active bounds.
    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        let full = self.embed(x)?;
        let mut grad = match self.model.grad(&full, self.data) {
            Ok(g) => {
                check_gradient(&g, full.len())?;
                Grad::from_iter(self.free.iter().map(|&i| g[i]))
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(x)?,
            Err(e) => return Err(e.into()),
        };
        self.project(x, &mut grad);
        Ok(grad)
    }
}

impl<'a, M: NegLogLikelihood> ProfileProblem<'a, M> {
    /// Finite-difference gradient: central first, forward if a central probe
    /// failed or produced a non-finite component.
    fn fd_gradient(&self, x: &Theta) -> Result<Grad, Error> {
        let failure: RefCell<Option<Error>> = RefCell::new(None);
        let nll = |t: &Theta| {
            self.cost(t).unwrap_or_else(|e| {
                failure.borrow_mut().get_or_insert(e);
                f64::NAN
            })
        };
        let central = x.central_diff(&nll);
        if failure.borrow().is_none() && check_gradient(&central, x.len()).is_ok() {
            return Ok(central);
        }
        failure.replace(None);
        let forward = x.forward_diff(&nll);
        if let Some(err) = failure.take() {
            return Err(err);
        }
        check_gradient(&forward, x.len())?;
        Ok(forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;
    use ndarray::array;

    /// `N = (a - 2)² + (b + 1)²`, no analytic gradient.
    struct Bowl;

    impl NegLogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Ok((theta[0] - 2.0).powi(2) + (theta[1] + 1.0).powi(2))
        }
    }

    /// Same bowl with an analytic gradient.
    struct AnalyticBowl;

    impl NegLogLikelihood for AnalyticBowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Bowl.value(theta, &())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok(array![2.0 * (theta[0] - 2.0), 2.0 * (theta[1] + 1.0)])
        }
    }

    fn params(b_constant: bool) -> ParameterSet {
        let a = Parameter::nuisance("a", 0.0, -1.0, 1.0).unwrap();
        let mut b = Parameter::nuisance("b", 0.5, -3.0, 3.0).unwrap();
        if b_constant {
            b = b.fixed();
        }
        ParameterSet::new(vec![a, b]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Constant parameters keep their template value and constrained mode
    // clamps the free ones into bounds.
    //
    // Given
    // -----
    // - `b` constant at 0.5, `a` free on [-1, 1].
    // - Trial vector `[5.0]` (outside `a`'s bounds).
    //
    // Expect
    // ------
    // - Embedded vector `[1.0, 0.5]`.
    fn embed_clamps_free_and_keeps_constants() {
        // Arrange
        let set = params(true);
        let problem = ProfileProblem::new(&Bowl, &(), &set, MinimizerMode::Constrained);

        // Act
        let full = problem.embed(&array![5.0]).unwrap();

        // Assert
        assert_eq!(problem.free_indices(), &[0]);
        assert_eq!(full, array![1.0, 0.5]);
        assert!(matches!(
            problem.embed(&array![0.0, 0.0]),
            Err(OptError::ThetaLengthMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Finite-difference and analytic gradients agree on the free subset.
    //
    // Given
    // -----
    // - Both parameters free, unconstrained mode, `x = [0.0, 0.5]`.
    //
    // Expect
    // ------
    // - Gradient ≈ `[-4, 3]` either way.
    fn gradient_fd_matches_analytic_subset() {
        // Arrange
        let set = params(false);
        let fd = ProfileProblem::new(&Bowl, &(), &set, MinimizerMode::Unconstrained);
        let an = ProfileProblem::new(&AnalyticBowl, &(), &set, MinimizerMode::Unconstrained);
        let x = fd.start();

        // Act
        let g_fd = fd.gradient(&x).unwrap();
        let g_an = an.gradient(&x).unwrap();

        // Assert
        assert!((g_fd[0] + 4.0).abs() < 1e-5 && (g_fd[1] - 3.0).abs() < 1e-5);
        assert_eq!(g_an, array![-4.0, 3.0]);
    }

    #[test]
    // Purpose
    // -------
    // At an active upper bound an outward-pushing gradient is zeroed in
    // constrained mode only.
    //
    // Given
    // -----
    // - `a` at its upper bound 1.0 where `∂N/∂a = -2` pushes outward.
    //
    // Expect
    // ------
    // - Component 0 is `0` in constrained mode and `-2` unconstrained.
    fn gradient_is_projected_at_active_bound() {
        // Arrange
        let mut set = params(false);
        set.set_value(0, 1.0);
        let c = ProfileProblem::new(&AnalyticBowl, &(), &set, MinimizerMode::Constrained);
        let u = ProfileProblem::new(&AnalyticBowl, &(), &set, MinimizerMode::Unconstrained);
        let x = c.start();

        // Act
        let gc = c.gradient(&x).unwrap();
        let gu = u.gradient(&x).unwrap();

        // Assert
        assert_eq!(gc[0], 0.0);
        assert_eq!(gu[0], -2.0);
        assert_eq!(gc[1], gu[1]);
    }
}
