//! One-parameter profile-likelihood intervals.
use tracing::info;

use crate::model::NegLogLikelihood;
use crate::scan::{
    boxes::{AxisInterval, EdgeCommit, profile_interval},
    context::ScanContext,
};
use crate::statistics::ONE_SIGMA_CL;

const SINGLE_DOF: usize = 1;
const ONE_SIGMA_QUANTILE: f64 = 0.32;
const TWO_SIGMA_CL: f64 = 0.95;

/// 68% (and optionally 95%) interval for one scanned parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SinglesInterval {
    pub one_sigma: AxisInterval,
    pub two_sigma: Option<AxisInterval>,
}

impl SinglesInterval {
    /// Best fit, distance down to the lower edge, distance up to the upper edge.
    pub fn asymmetric_errors(&self) -> (f64, f64, f64) {
        let i = &self.one_sigma;
        (i.best_fit, i.best_fit - i.lower, i.upper - i.best_fit)
    }
}

/// Intervals for every scanned parameter, other scanned parameters floating.
pub fn scan_singles<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, do95: bool,
) -> Vec<SinglesInterval> {
    let one_sigma = ctx.threshold(ONE_SIGMA_CL, SINGLE_DOF);
    let two_sigma = ctx.threshold(TWO_SIGMA_CL, SINGLE_DOF);
    (0..ctx.dimension())
        .map(|k| {
            let edges = EdgeCommit { quantile: ONE_SIGMA_QUANTILE, dof: SINGLE_DOF };
            let interval = profile_interval(ctx, k, one_sigma, Some(edges));
            let wide = do95.then(|| {
                let edges = EdgeCommit { quantile: 1.0 - TWO_SIGMA_CL, dof: SINGLE_DOF };
                profile_interval(ctx, k, two_sigma, Some(edges))
            });
            let single = SinglesInterval { one_sigma: interval, two_sigma: wide };
            let (best, down, up) = single.asymmetric_errors();
            info!(parameter = %single.one_sigma.name, best, down, up, "68% interval");
            single
        })
        .collect()
}
