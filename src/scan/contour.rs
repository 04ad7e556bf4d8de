//! Slice-wise 2-D contour: for a sequence of second-axis values, find where
//! the first-axis profile leaves the region on either side.
//!
//! The second axis is sampled at `yc + yr·cos(jπ/points)`, `j = 0..=points`,
//! where `yc ± yr` is the `cl` box along it, which concentrates slices near
//! the top and bottom of the region. On each slice the first axis is
//! re-minimized without bounds from its best-fit value, then
//! [`find_crossing`] runs toward both first-axis box edges. A slice whose
//! minimization does not converge is still searched, starting from wherever
//! the minimizer stopped.
use std::f64::consts::PI;

use tracing::{debug, info, warn};

use crate::model::NegLogLikelihood;
use crate::optimization::profile_minimizer::MinimizerMode;
use crate::scan::{
    boxes::{ThresholdBox, build_box},
    context::ScanContext,
    crossing::{CrossingOptions, find_crossing},
    point::PointStatus,
};

/// Trace the `cl` contour of a 2-D scan; returns the box used to place
/// the slices.
pub fn scan_contour<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, points: usize, cl: f64,
) -> ThresholdBox {
    let dof = ctx.dof();
    let threshold = ctx.threshold(cl, dof);
    let bx = build_box(ctx, cl, false);
    let (x_box, y_box) = (&bx.axes[0], &bx.axes[1]);
    let (yc, yr) = (y_box.center(), y_box.half_width());
    let (x_lo, x_hi) = (x_box.lower, x_box.upper);
    let quantile = 1.0 - cl;

    ctx.scoped(|c| {
        c.fix_pois(true);
        let mut found = 0usize;
        for j in 0..=points {
            if !c.in_range(j) {
                continue;
            }
            let y = yc + yr * (j as f64 * PI / points.max(1) as f64).cos();
            c.restore_best_fit();
            c.set_poi(1, y);
            c.fix_poi(0, false);
            if !c.minimize_here(MinimizerMode::Unconstrained) {
                warn!(slice = j, y, "slice minimization did not converge; continuing from the reached value");
            }
            c.fix_poi(0, true);
            let Some(slice_min) = c.nll_here() else {
                debug!(slice = j, y, "slice minimum cannot be evaluated; skipping");
                continue;
            };
            if slice_min >= threshold {
                debug!(slice = j, y, "slice lies outside the region");
                continue;
            }
            let x_min = c.poi_values()[0];
            let slice_state = c.snapshot();
            for limit in [x_hi, x_lo] {
                c.restore_values(&slice_state);
                if let Some(x) = find_crossing(c, 0, threshold, x_min, limit, CrossingOptions::default()) {
                    let delta = c.nll_here().map_or(threshold - c.nll0(), |nll| nll - c.nll0());
                    c.commit(delta, quantile, PointStatus::Crossing);
                    debug!(slice = j, x, y, "contour crossing");
                    found += 1;
                }
            }
        }
        info!(cl, slices = points + 1, crossings = found, "contour2d finished");
    });
    bx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NllEvaluator;
    use crate::optimization::profile_minimizer::{LocalMinimizer, ProfileMinimizer};
    use crate::scan::config::{PointRange, ProfilingPolicy};
    use crate::scan::context::ScanSetup;
    use crate::scan::point::VecSink;
    use crate::scan::test_support::{Circle, Fixture};

    #[test]
    // Purpose
    // -------
    // On a circular objective every committed crossing lies on the circle
    // `x² + y² = Q` at the 2-dof threshold.
    //
    // Given
    // -----
    // - `½(x² + y²)` on [-3, 3]², cl = 0.68 → `Q = −2 ln 0.32`, 8 slices.
    //
    // Expect
    // ------
    // - Two crossings on each interior slice, at most two on the extreme
    //   slices, each within 1e-3 of the circle; all `Crossing` with quantile
    //   0.32; the state is restored.
    fn contour_points_lie_on_circle() {
        // Arrange
        let mut fx = Fixture::circle();
        let before = fx.eval.parameters().snapshot();
        let mut sink = VecSink::new();
        let q = -2.0 * 0.32f64.ln();

        // Act
        let bx = scan_contour(&mut fx.open_context(&mut sink), 8, 0.68);

        // Assert
        assert!((bx.axes[1].half_width() - q.sqrt()).abs() < 1e-3);
        assert!(sink.len() >= 14 && sink.len() <= 18, "n = {}", sink.len());
        for p in &sink.points {
            let r2 = p.coordinates[0].powi(2) + p.coordinates[1].powi(2);
            assert!((r2.sqrt() - q.sqrt()).abs() < 1e-3, "point {:?}", p.coordinates);
            assert_eq!(p.status, PointStatus::Crossing);
            assert!((p.quantile - 0.32).abs() < 1e-12);
        }
        assert_eq!(fx.eval.parameters().snapshot(), before);
    }

    #[test]
    // Purpose
    // -------
    // Slices honour the range filter.
    //
    // Given
    // -----
    // - Range [2, 3] on 8 slices.
    //
    // Expect
    // ------
    // - Exactly two interior slices → four crossings.
    fn slices_honour_range() {
        // Arrange
        let mut fx = Fixture::circle();
        let mut sink = VecSink::new();
        let range = PointRange::new(Some(2), Some(3)).unwrap();

        // Act
        scan_contour(&mut fx.context(&mut sink, ProfilingPolicy::default(), range), 8, 0.68);

        // Assert
        assert_eq!(sink.len(), 4);
    }

    /// Delegates to the L-BFGS minimizer, except that unconstrained slice
    /// minimizations park `x` at 0.25 and report failure.
    struct StallsOnSlices(ProfileMinimizer);

    impl LocalMinimizer<Circle> for StallsOnSlices {
        fn minimize(&self, evaluator: &mut NllEvaluator<Circle>, mode: MinimizerMode) -> bool {
            match mode {
                MinimizerMode::Constrained => self.0.minimize(evaluator, mode),
                MinimizerMode::Unconstrained => {
                    evaluator.parameters_mut().set_value(0, 0.25);
                    false
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // A slice whose first-axis minimization does not converge is searched
    // from the value the minimizer reached instead of being dropped.
    //
    // Given
    // -----
    // - `½(x² + y²)` on [-3, 3]², cl = 0.68, 8 slices, and a minimizer whose
    //   slice minimizations stop at `x = 0.25` without converging.
    //
    // Expect
    // ------
    // - The two extreme slices, where `x = 0.25` is already outside the
    //   region, are skipped; the seven interior slices give fourteen
    //   crossings, all on the circle.
    fn unconverged_slice_is_still_searched() {
        // Arrange
        let mut fx = Fixture::circle();
        let nll0 = fx.eval.evaluate();
        let setup = ScanSetup {
            poi: fx.poi.clone(),
            aux: fx.aux.clone(),
            nll0,
            dof: fx.dof,
            policy: ProfilingPolicy::default(),
            range: PointRange::default(),
        };
        let minimizer = StallsOnSlices(ProfileMinimizer::default());
        let mut sink = VecSink::new();
        let q = -2.0 * 0.32f64.ln();

        // Act
        scan_contour(&mut ScanContext::new(&mut fx.eval, &minimizer, &mut sink, setup), 8, 0.68);

        // Assert
        assert_eq!(sink.len(), 14);
        for p in &sink.points {
            let r = p.coordinates[0].hypot(p.coordinates[1]);
            assert!((r - q.sqrt()).abs() < 1e-3, "point {:?}", p.coordinates);
            assert_eq!(p.status, PointStatus::Crossing);
        }
    }
}
