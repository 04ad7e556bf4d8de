//! N-dimensional neighbourhood scan.
//!
//! Each axis gets `floor(B^(1/N))` points split at the best fit in
//! proportion to the room on either side; a multi-index's signed offsets
//! from the origin go through the point law, so offset 0 is the best fit
//! itself. Points are visited with the first axis varying fastest.
use tracing::info;

use crate::model::NegLogLikelihood;
use crate::scan::{
    context::ScanContext,
    distribution::{PointDistributor, floor_root},
};

struct AxisLaw {
    law: PointDistributor,
    left: usize,
    right: usize,
}

/// Run the neighbourhood scan over every scanned parameter.
pub fn scan_smart<M: NegLogLikelihood>(
    ctx: &mut ScanContext<'_, M>, points: usize, power: f64,
) {
    let dim = ctx.dimension();
    if dim == 0 {
        return;
    }
    let per_axis = floor_root(points, dim);
    let axes: Vec<AxisLaw> = (0..dim)
        .map(|k| {
            let (lo, hi) = ctx.poi_bounds(k);
            let origin = ctx.poi_best_fit(k);
            let left = if hi > lo {
                ((per_axis as f64 * (origin - lo) / (hi - lo)).floor() as usize).min(per_axis)
            } else {
                0
            };
            AxisLaw { law: PointDistributor::new(origin, lo, hi, power), left, right: per_axis - left }
        })
        .collect();
    let total = per_axis.checked_pow(u32::try_from(dim).unwrap_or(u32::MAX)).unwrap_or(usize::MAX);
    info!(dimension = dim, per_axis, total, power, "neighbourhood scan");

    ctx.scoped(|c| {
        c.fix_pois(true);
        let mut coords = vec![0.0; dim];
        for i in 0..total {
            if !c.in_range(i) {
                continue;
            }
            let mut stride = 1usize;
            for (k, axis) in axes.iter().enumerate() {
                let index = (i / stride) % per_axis;
                let offset = index as isize - axis.left as isize;
                coords[k] = axis.law.offset_value(offset, axis.left, axis.right);
                stride *= per_axis;
            }
            c.scan_point(i, &coords);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::point::VecSink;
    use crate::scan::test_support::{Fixture, ScanModel};

    #[test]
    // Purpose
    // -------
    // The scan covers `floor(√B)²` points, includes the best fit exactly,
    // and stays inside the bounds.
    //
    // Given
    // -----
    // - 2-D scan model at best fit (1, −½), budget 30 → 5×5, power 1.
    //
    // Expect
    // ------
    // - 25 points; one at exactly (1, −½) with `deltaNLL ≈ 0`; every
    //   coordinate inside its axis bounds.
    fn neighbourhood_covers_origin() {
        // Arrange
        let mut fx = Fixture::new(ScanModel::default());
        let mut sink = VecSink::new();

        // Act
        scan_smart(&mut fx.open_context(&mut sink), 30, 1.0);

        // Assert
        assert_eq!(sink.len(), 25);
        let origin = sink
            .points
            .iter()
            .find(|p| p.coordinates == vec![1.0, -0.5])
            .expect("best fit visited");
        assert!(origin.delta_nll.abs() < 1e-9);
        assert!(sink.points.iter().all(|p| {
            (-2.0..=4.0).contains(&p.coordinates[0]) && (-4.0..=3.0).contains(&p.coordinates[1])
        }));
    }

    #[test]
    // Purpose
    // -------
    // Offsets run from `−left` to `right − 1` on the first axis.
    //
    // Given
    // -----
    // - 1-D scan, `x` in [-2, 4] with best fit 1, 10 points, power 1 →
    //   `left = 5`, `right = 5`.
    //
    // Expect
    // ------
    // - First point at the lower bound -2, sixth at the origin 1, last one
    //   step (0.6) short of the upper bound.
    fn one_dim_offsets_span_left_to_right() {
        // Arrange
        let mut fx = Fixture::one_dim(ScanModel::default());
        let mut sink = VecSink::new();

        // Act
        scan_smart(&mut fx.open_context(&mut sink), 10, 1.0);

        // Assert
        assert_eq!(sink.len(), 10);
        assert_eq!(sink.points[0].coordinates, vec![-2.0]);
        assert_eq!(sink.points[5].coordinates, vec![1.0]);
        assert!((sink.points[9].coordinates[0] - 3.4).abs() < 1e-12);
    }
}
