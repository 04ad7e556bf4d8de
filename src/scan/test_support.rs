//! Analytic toy likelihoods and a context fixture shared by the scan tests.
use ndarray::array;

use crate::model::{NegLogLikelihood, NllEvaluator, Parameter, ParameterSet};
use crate::optimization::{
    errors::{OptError, OptResult},
    profile_minimizer::{Grad, ProfileMinimizer, Theta},
};
use crate::scan::{
    config::{PointRange, ProfilingPolicy},
    context::{ScanContext, ScanSetup},
    point::ResultSink,
};

/// `N = ½[(x − 1)² + (y + ½)²/4 + 4(θ − x/2)²]` over `(x, y, θ)`.
///
/// Profiling θ gives `ΔN = ½[(x − 1)² + (y + ½)²/4]`, so the `q`-level box
/// is `x = 1 ± √q`, `y = −½ ± 2√q`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScanModel {
    /// Evaluations with `x` above this value fail.
    pub refuse_above: Option<f64>,
}

impl NegLogLikelihood for ScanModel {
    type Data = ();

    fn value(&self, t: &Theta, _: &()) -> OptResult<f64> {
        if self.refuse_above.is_some_and(|r| t[0] > r) {
            return Err(OptError::NonFiniteCost { value: f64::NAN });
        }
        let c = t[2] - 0.5 * t[0];
        Ok(0.5 * ((t[0] - 1.0).powi(2) + (t[1] + 0.5).powi(2) / 4.0 + 4.0 * c * c))
    }

    fn grad(&self, t: &Theta, _: &()) -> OptResult<Grad> {
        let c = t[2] - 0.5 * t[0];
        Ok(array![(t[0] - 1.0) - 2.0 * c, (t[1] + 0.5) / 4.0, 4.0 * c])
    }
}

/// `N = ½(x² + y²)`: circular contours of radius `√(2·level)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Circle;

impl NegLogLikelihood for Circle {
    type Data = ();

    fn value(&self, t: &Theta, _: &()) -> OptResult<f64> {
        Ok(0.5 * (t[0] * t[0] + t[1] * t[1]))
    }

    fn grad(&self, t: &Theta, _: &()) -> OptResult<Grad> {
        Ok(array![t[0], t[1]])
    }
}

pub(crate) struct Fixture<M: NegLogLikelihood> {
    pub eval: NllEvaluator<M>,
    pub minimizer: ProfileMinimizer,
    pub poi: Vec<usize>,
    pub aux: Vec<usize>,
    pub dof: usize,
}

impl Fixture<ScanModel> {
    /// `x, y` scanned at the best fit `(1, −½)`, θ recorded.
    pub fn new(model: ScanModel) -> Self {
        let params = ParameterSet::new(vec![
            Parameter::interest("x", 1.0, -2.0, 4.0).unwrap(),
            Parameter::interest("y", -0.5, -4.0, 3.0).unwrap(),
            Parameter::nuisance("theta", 0.5, -5.0, 5.0).unwrap(),
        ])
        .unwrap();
        Self {
            eval: NllEvaluator::new(model, (), params),
            minimizer: ProfileMinimizer::default(),
            poi: vec![0, 1],
            aux: vec![2],
            dof: 2,
        }
    }

    /// Only `x` scanned; `y` held at its best fit.
    pub fn one_dim(model: ScanModel) -> Self {
        let mut fx = Self::new(model);
        fx.eval.parameters_mut().set_constant(1, true);
        fx.poi = vec![0];
        fx.dof = 1;
        fx
    }
}

impl Fixture<Circle> {
    /// `x, y ∈ [−3, 3]` at the best fit `(0, 0)`.
    pub fn circle() -> Self {
        let params = ParameterSet::new(vec![
            Parameter::interest("x", 0.0, -3.0, 3.0).unwrap(),
            Parameter::interest("y", 0.0, -3.0, 3.0).unwrap(),
        ])
        .unwrap();
        Self {
            eval: NllEvaluator::new(Circle, (), params),
            minimizer: ProfileMinimizer::default(),
            poi: vec![0, 1],
            aux: vec![],
            dof: 2,
        }
    }
}

impl<M: NegLogLikelihood<Data = ()>> Fixture<M> {
    pub fn from_parts(
        model: M, params: ParameterSet, poi: Vec<usize>, aux: Vec<usize>, dof: usize,
    ) -> Self {
        Self {
            eval: NllEvaluator::new(model, (), params),
            minimizer: ProfileMinimizer::default(),
            poi,
            aux,
            dof,
        }
    }
}

impl<M: NegLogLikelihood> Fixture<M> {
    /// Context over the fixture with `nll0` evaluated at the current state.
    pub fn context<'a>(
        &'a mut self, sink: &'a mut dyn ResultSink, policy: ProfilingPolicy, range: PointRange,
    ) -> ScanContext<'a, M> {
        let nll0 = self.eval.evaluate();
        let setup = ScanSetup {
            poi: self.poi.clone(),
            aux: self.aux.clone(),
            nll0,
            dof: self.dof,
            policy,
            range,
        };
        ScanContext::new(&mut self.eval, &self.minimizer, sink, setup)
    }

    /// Context with default profiling and an open range.
    pub fn open_context<'a>(&'a mut self, sink: &'a mut dyn ResultSink) -> ScanContext<'a, M> {
        self.context(sink, ProfilingPolicy::default(), PointRange::default())
    }
}
