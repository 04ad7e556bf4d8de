//! Bisection for the point where a profile crosses a threshold.
//!
//! The profile along one scanned parameter is assumed to rise from `start`
//! (inside the region) towards `limit`. If it is still below the threshold
//! at `limit` there is no crossing in range. Every probe profiles the free
//! parameters from the state captured on entry, regardless of the fast-scan
//! policy; a probe that cannot be evaluated counts as outside the region.
use tracing::{debug, warn};

use crate::model::{NegLogLikelihood, ParameterSnapshot};
use crate::optimization::profile_minimizer::MinimizerMode;
use crate::scan::context::ScanContext;

/// Stopping rules for [`find_crossing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingOptions {
    /// Bracket width, relative to `|limit − start|`, below which bisection stops.
    pub x_tol: f64,
    /// Distance from the threshold accepted as a crossing.
    pub f_tol: f64,
    pub max_iter: usize,
}

impl Default for CrossingOptions {
    fn default() -> Self {
        Self { x_tol: 1e-6, f_tol: 1e-4, max_iter: 100 }
    }
}

/// Locate where scanned parameter `axis` crosses `threshold` between `start`
/// and `limit`.
///
/// Returns `None` when the objective at `limit` is still below the threshold.
/// On `Some(x)` the parameter state is left at the profiled point `x`; on
/// `None` it is left at the profiled `limit`.
pub fn find_crossing<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, axis: usize, threshold: f64, start: f64, limit: f64,
    opts: CrossingOptions,
) -> Option<f64> {
    let entry = ctx.snapshot();
    let f_limit = profile_at(ctx, &entry, axis, limit);
    if f_limit < threshold {
        debug!(parameter = ctx.poi_name(axis), limit, "no crossing before the bound");
        return None;
    }

    let span_tol = opts.x_tol * (limit - start).abs();
    let (mut inside, mut outside) = (start, limit);
    let mut mid = 0.5 * (inside + outside);
    for _ in 0..opts.max_iter {
        mid = 0.5 * (inside + outside);
        let f = profile_at(ctx, &entry, axis, mid);
        if (f - threshold).abs() < opts.f_tol || (outside - inside).abs() < span_tol {
            return Some(mid);
        }
        if f < threshold {
            inside = mid;
        } else {
            outside = mid;
        }
    }
    warn!(
        parameter = ctx.poi_name(axis),
        crossing = mid,
        "crossing search hit its iteration limit"
    );
    Some(mid)
}

fn profile_at<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, entry: &ParameterSnapshot, axis: usize, x: f64,
) -> f64 {
    ctx.restore_values(entry);
    ctx.set_poi(axis, x);
    ctx.profiled_or_unprofiled(MinimizerMode::Constrained)
}
