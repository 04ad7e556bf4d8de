//! model::evaluator — stateful objective evaluation with an error log.
//!
//! Purpose
//! -------
//! Bind a [`NegLogLikelihood`] model and its data to a mutable
//! [`ParameterSet`], so scan components can move parameters around and ask
//! "what is the objective here?" without threading vectors by hand.
//!
//! Key behaviors
//! -------------
//! - [`NllEvaluator::evaluate`] evaluates the model at the current parameter
//!   values. A model error or a non-finite value is recorded in the
//!   evaluation-error log and reported as `NaN`.
//! - [`NllEvaluator::clear_eval_error_log`] / [`NllEvaluator::num_eval_errors`]
//!   let callers bracket a single evaluation and detect invalid points.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only `evaluate` touches the error log; objective calls made internally
//!   by a minimizer do not.
//! - The evaluator owns its model and data; wrap borrowed models in a
//!   reference-implementing newtype if sharing is needed.
use tracing::debug;

use crate::model::{
    params::ParameterSet,
    snapshot::HoldsParameters,
    traits::NegLogLikelihood,
};
use crate::optimization::errors::OptResult;

/// Objective evaluator over a mutable parameter set.
pub struct NllEvaluator<M: NegLogLikelihood> {
    model: M,
    data: M::Data,
    params: ParameterSet,
    eval_errors: usize,
}

impl<M: NegLogLikelihood> NllEvaluator<M> {
    pub fn new(model: M, data: M::Data, params: ParameterSet) -> Self {
        Self { model, data, params, eval_errors: 0 }
    }

    /// Evaluate `N(θ)` at the current parameter values.
    ///
    /// Returns `NaN` and increments the error log when the model fails or
    /// returns a non-finite value.
    pub fn evaluate(&mut self) -> f64 {
        let theta = self.params.values();
        match self.model.value(&theta, &self.data) {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                self.eval_errors += 1;
                debug!(value, "objective returned a non-finite value");
                f64::NAN
            }
            Err(err) => {
                self.eval_errors += 1;
                debug!(%err, "objective evaluation failed");
                f64::NAN
            }
        }
    }

    /// Run the model's `check` hook at the current parameter values.
    pub fn check(&self) -> OptResult<()> {
        self.model.check(&self.params.values(), &self.data)
    }

    pub fn clear_eval_error_log(&mut self) {
        self.eval_errors = 0;
    }

    pub fn num_eval_errors(&self) -> usize {
        self.eval_errors
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn data(&self) -> &M::Data {
        &self.data
    }

    /// Consume the evaluator and hand back its parameter set.
    pub fn into_parameters(self) -> ParameterSet {
        self.params
    }
}

impl<M: NegLogLikelihood> HoldsParameters for NllEvaluator<M> {
    fn parameter_set(&self) -> &ParameterSet {
        &self.params
    }

    fn parameter_set_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::Parameter;
    use crate::optimization::{
        errors::{OptError, OptResult},
        profile_minimizer::Theta,
    };

    /// `N(x) = x²` that refuses negative arguments.
    struct HalfLine;

    impl NegLogLikelihood for HalfLine {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            if theta[0] < 0.0 {
                return Err(OptError::NonFiniteCost { value: f64::NAN });
            }
            Ok(theta[0] * theta[0])
        }
    }

    fn evaluator() -> NllEvaluator<HalfLine> {
        let params =
            ParameterSet::new(vec![Parameter::interest("x", 2.0, -1.0, 3.0).unwrap()]).unwrap();
        NllEvaluator::new(HalfLine, (), params)
    }

    #[test]
    // Purpose
    // -------
    // Valid points evaluate cleanly and leave the error log empty.
    //
    // Given
    // -----
    // - `x = 2`.
    //
    // Expect
    // ------
    // - Value `4`, zero errors.
    fn evaluate_returns_value_without_errors() {
        // Arrange
        let mut eval = evaluator();

        // Act
        let v = eval.evaluate();

        // Assert
        assert_eq!(v, 4.0);
        assert_eq!(eval.num_eval_errors(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Model errors are logged and surfaced as NaN; clearing resets the log.
    //
    // Given
    // -----
    // - `x = -0.5` in the refused half-line.
    //
    // Expect
    // ------
    // - `NaN`, one logged error, zero after `clear_eval_error_log`.
    fn evaluate_logs_model_errors() {
        // Arrange
        let mut eval = evaluator();
        eval.parameters_mut().set_value(0, -0.5);

        // Act
        let v = eval.evaluate();

        // Assert
        assert!(v.is_nan());
        assert_eq!(eval.num_eval_errors(), 1);
        eval.clear_eval_error_log();
        assert_eq!(eval.num_eval_errors(), 0);
    }
}
