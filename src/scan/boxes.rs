//! scan::boxes — per-axis confidence intervals and threshold boxes.
//!
//! Purpose
//! -------
//! Bound a confidence region axis by axis: for each scanned parameter, hold
//! it constant, let every other scanned parameter float, and locate where the
//! profile crosses the threshold toward each bound.
//!
//! Key behaviors
//! -------------
//! - [`build_box`] uses `threshold = nll0 + ½·χ²⁻¹(1 − cl; dof)` with the
//!   context's degrees of freedom; the `cross` algorithm commits its edges,
//!   `contour2d` builds its box silently.
//! - A found crossing is committed with quantile `1 − cl` and status
//!   [`PointStatus::Crossing`].
//! - Without a crossing the axis limit becomes the edge and the profiled
//!   limit point is committed with its true p-value and status
//!   [`PointStatus::RangeEdge`].
//! - [`profile_interval`] is the single-axis building block shared with the
//!   `singles` algorithm, which uses one degree of freedom.
//!
//! Invariants & assumptions
//! ------------------------
//! - Each axis search runs under [`ScanContext::scoped`]; the caller's values
//!   and constant flags are restored afterwards.
//! - Both searches on an axis start from the best-fit state.
use tracing::info;

use crate::model::NegLogLikelihood;
use crate::scan::{
    context::{PointEval, ScanContext},
    crossing::{CrossingOptions, find_crossing},
    point::PointStatus,
};
use crate::statistics::p_value;

/// Profile-likelihood interval along one scanned parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisInterval {
    pub name: String,
    pub best_fit: f64,
    pub lower: f64,
    pub upper: f64,
    /// `false` when the edge is the axis limit rather than a crossing.
    pub lower_is_crossing: bool,
    pub upper_is_crossing: bool,
}

impl AxisInterval {
    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    pub fn half_width(&self) -> f64 {
        0.5 * (self.upper - self.lower)
    }
}

/// Axis-aligned box bounding the `cl` region.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBox {
    pub name: String,
    pub cl: f64,
    pub axes: Vec<AxisInterval>,
}

/// How edges found by [`profile_interval`] are committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCommit {
    /// Quantile stored with real crossings.
    pub quantile: f64,
    /// Degrees of freedom for the p-value of range edges.
    pub dof: usize,
}

/// Build the `cl` box over every scanned parameter.
pub fn build_box<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, cl: f64, commit: bool,
) -> ThresholdBox {
    let dof = ctx.dof();
    let threshold = ctx.threshold(cl, dof);
    let edges = commit.then_some(EdgeCommit { quantile: 1.0 - cl, dof });
    let axes: Vec<AxisInterval> =
        (0..ctx.dimension()).map(|k| profile_interval(ctx, k, threshold, edges)).collect();
    for axis in &axes {
        info!(
            parameter = %axis.name,
            cl,
            lower = axis.lower,
            upper = axis.upper,
            "box edges"
        );
    }
    ThresholdBox { name: format!("box_cl{}", (cl * 100.0).round()), cl, axes }
}

/// Interval of scanned parameter `k` at `threshold`, other scanned
/// parameters floating.
pub fn profile_interval<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, k: usize, threshold: f64, commit: Option<EdgeCommit>,
) -> AxisInterval {
    ctx.scoped(|c| {
        c.fix_pois(false);
        c.fix_poi(k, true);
        let best_fit = c.poi_best_fit(k);
        let (min, max) = c.poi_bounds(k);
        let (lower, lower_is_crossing) = locate_edge(c, k, threshold, best_fit, min, commit);
        let (upper, upper_is_crossing) = locate_edge(c, k, threshold, best_fit, max, commit);
        AxisInterval {
            name: c.poi_name(k).to_owned(),
            best_fit,
            lower,
            upper,
            lower_is_crossing,
            upper_is_crossing,
        }
    })
}

fn locate_edge<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, k: usize, threshold: f64, start: f64, limit: f64,
    commit: Option<EdgeCommit>,
) -> (f64, bool) {
    ctx.restore_best_fit();
    let found = find_crossing(ctx, k, threshold, start, limit, CrossingOptions::default());
    let Some(edges) = commit else {
        return found.map_or((limit, false), |x| (x, true));
    };
    let nll0 = ctx.nll0();
    match found {
        Some(x) => {
            let delta = ctx.nll_here().map_or(threshold - nll0, |nll| nll - nll0);
            ctx.commit(delta, edges.quantile, PointStatus::Crossing);
            (x, true)
        }
        None => {
            match ctx.nll_here() {
                Some(nll) => {
                    let delta = nll - nll0;
                    ctx.commit(delta, p_value(delta, edges.dof), PointStatus::RangeEdge);
                }
                None => ctx.commit_eval(PointEval::invalid()),
            }
            (limit, false)
        }
    }
}
