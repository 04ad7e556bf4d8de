//! scan::grid — regular grid scans in one, two, and N dimensions.
//!
//! Purpose
//! -------
//! Evaluate the profiled objective on a grid of scanned-parameter values and
//! commit one point per grid index owned by this job.
//!
//! Key behaviors
//! -------------
//! - **1-D** with `power > 1`: bracket the profile minimum first
//!   ([`bracket_minimum`]), then spend the remaining budget on both sides of
//!   the bracketed origin with the power law. Global indices: probes, then
//!   the upper side, then the lower side.
//! - **1-D** with `power < 1`: the same two-sided sweep around the best fit
//!   with the bound-anchored law (upper side first).
//! - **1-D** with `power == 1`: `points` uniform cell centres.
//! - **2-D / N-D**: `ceil(B^(1/n))` cell centres per axis, visited
//!   row-major (the last scanned parameter varies fastest).
//! - **3×3 refinement** (2-D only): around each lattice point whose
//!   `deltaNLL` lies within 0.5 of 1.15 or 2.995, the eight neighbours at
//!   ±⅓ cell are evaluated from the centre's profiled state and committed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every scan runs inside [`ScanContext::scoped`] with the scanned
//!   parameters held constant; the caller's state is restored afterwards.
//! - Each point starts from the best-fit values (or, for 3×3 neighbours,
//!   from the centre's state).
use tracing::{debug, info};

use crate::model::NegLogLikelihood;
use crate::scan::{
    bracket::{Bracket, bracket_minimum},
    context::ScanContext,
    distribution::{PointDistributor, Side, ceil_root, cell_centers},
};

/// Contour levels the 3×3 refinement concentrates on.
pub const REFINE_LEVELS: [f64; 2] = [1.15, 2.995];

/// Maximum distance from a refine level that triggers refinement.
pub const REFINE_WINDOW: f64 = 0.5;

const NEIGHBOUR_STEP: f64 = 0.333_333_33;

/// Run a grid scan over the context's scanned parameters.
///
/// Returns the minimum bracket when a 1-D scan with `power > 1` was run.
pub fn scan_grid<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, points: usize, power: f64,
) -> Option<Bracket> {
    ctx.scoped(|c| {
        c.fix_pois(true);
        match c.dimension() {
            0 => None,
            1 => scan_line(c, points, power),
            n => {
                scan_lattice(c, points, n, false);
                None
            }
        }
    })
}

/// 2-D grid with 3×3 refinement near the 1σ and 2σ contours.
pub fn scan_grid_3x3<M: NegLogLikelihood>(ctx: &mut ScanContext<'_, M>, points: usize) {
    ctx.scoped(|c| {
        c.fix_pois(true);
        scan_lattice(c, points, 2, true);
    });
}

fn scan_line<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, points: usize, power: f64,
) -> Option<Bracket> {
    let (min, max) = ctx.poi_bounds(0);
    if power == 1.0 {
        for (i, x) in cell_centers(min, max, points).into_iter().enumerate() {
            ctx.scan_point(i, &[x]);
        }
        return None;
    }

    let (bracket, origin, offset) = if power > 1.0 {
        let bracket = bracket_minimum(ctx, points);
        (Some(bracket), bracket.origin, bracket.probes)
    } else {
        (None, ctx.poi_best_fit(0), 0)
    };
    let law = PointDistributor::new(origin, min, max, power);
    let (n_lower, n_upper) = law.split(points.saturating_sub(offset));
    debug!(origin = law.origin(), n_lower, n_upper, "sweeping both sides of the origin");

    for i in 1..=n_upper {
        ctx.scan_point(offset + i - 1, &[law.value(Side::Upper, i, n_upper)]);
    }
    for i in 1..=n_lower {
        ctx.scan_point(offset + n_upper + i - 1, &[law.value(Side::Lower, i, n_lower)]);
    }
    bracket
}

fn scan_lattice<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, points: usize, dim: usize, refine: bool,
) {
    let per_axis = ceil_root(points, dim);
    let axes: Vec<Vec<f64>> = (0..dim)
        .map(|k| {
            let (lo, hi) = ctx.poi_bounds(k);
            cell_centers(lo, hi, per_axis)
        })
        .collect();
    let steps: Vec<f64> = (0..dim)
        .map(|k| {
            let (lo, hi) = ctx.poi_bounds(k);
            (hi - lo) / per_axis as f64
        })
        .collect();
    let total = per_axis.pow(u32::try_from(dim).unwrap_or(u32::MAX));
    info!(dimension = dim, per_axis, total, refine, "grid scan");

    let mut index = vec![0usize; dim];
    for ipoint in 0..total {
        if ipoint > 0 {
            advance(&mut index, per_axis);
        }
        if !ctx.in_range(ipoint) {
            continue;
        }
        let coords: Vec<f64> = index.iter().enumerate().map(|(k, &i)| axes[k][i]).collect();
        let Some(centre) = ctx.scan_point(ipoint, &coords) else {
            continue;
        };
        if refine && centre.is_valid() && near_refine_level(centre.delta_nll) {
            refine_neighbours(ctx, &coords, &steps);
        }
    }
}

/// Row-major odometer step: the last axis varies fastest.
fn advance(index: &mut [usize], per_axis: usize) {
    for slot in index.iter_mut().rev() {
        *slot += 1;
        if *slot < per_axis {
            return;
        }
        *slot = 0;
    }
}

fn near_refine_level(delta_nll: f64) -> bool {
    REFINE_LEVELS.iter().any(|level| (delta_nll - level).abs() < REFINE_WINDOW)
}

fn refine_neighbours<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, centre: &[f64], steps: &[f64],
) {
    let centre_state = ctx.snapshot();
    for di in -1i32..=1 {
        for dj in -1i32..=1 {
            if di == 0 && dj == 0 {
                continue;
            }
            ctx.restore_values(&centre_state);
            ctx.set_poi(0, centre[0] + NEIGHBOUR_STEP * f64::from(di) * steps[0]);
            ctx.set_poi(1, centre[1] + NEIGHBOUR_STEP * f64::from(dj) * steps[1]);
            let eval = ctx.evaluate_here();
            ctx.commit_eval(eval);
        }
    }
}
