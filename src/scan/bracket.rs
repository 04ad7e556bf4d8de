//! Golden-thirds search for the minimum of a 1-D profile.
//!
//! Each iteration evaluates the profile at `a + (b − a)/3` and
//! `b − (b − a)/3` and drops the third beyond the higher point. The search
//! stops after `points / 2` iterations or once `b − a` falls below
//! `(max − min)/points`. Every probe is a regular scan point: it is always
//! evaluated (so later decisions are identical across batch jobs) and
//! committed only when its index `2·iteration + {0, 1}` lies in range.
use tracing::{info, warn};

use crate::model::NegLogLikelihood;
use crate::scan::context::{PointEval, ScanContext};

/// Result of [`bracket_minimum`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Last evaluated probe pair.
    pub lower: f64,
    pub upper: f64,
    /// Midpoint of the final pair; used as the origin of the point law.
    pub origin: f64,
    /// Scan points spent on probing.
    pub probes: usize,
    /// The final pair is still wider than the target precision.
    pub too_wide: bool,
    /// The final pair touches one of the axis bounds.
    pub at_edge: bool,
}

fn comparable(eval: PointEval) -> f64 {
    if eval.is_valid() { eval.delta_nll } else { f64::INFINITY }
}

/// Bracket the minimum of the profile along scanned parameter 0.
///
/// The caller holds the scanned parameter constant.
pub fn bracket_minimum<M: NegLogLikelihood>(ctx: &mut ScanContext<'_, M>, points: usize) -> Bracket {
    let (min, max) = ctx.poi_bounds(0);
    let precision = (max - min) / points.max(1) as f64;
    let (mut a, mut b) = (min, max);
    let (mut x1, mut x2) = (min, max);
    let mut probes = 0;

    for iteration in 0..points / 2 {
        if b - a < precision {
            break;
        }
        let d = (b - a) / 3.0;
        x1 = a + d;
        x2 = b - d;
        let y1 = comparable(ctx.probe(2 * iteration, &[x1]));
        let y2 = comparable(ctx.probe(2 * iteration + 1, &[x2]));
        probes += 2;
        if y1 < y2 {
            b = x2;
        } else {
            a = x1;
        }
    }

    let too_wide = x2 - x1 > precision;
    let at_edge = x2 - min < precision || max - x1 < precision;
    if too_wide {
        warn!(
            width = x2 - x1,
            precision, "minimum bracket is wider than the grid spacing; increase the points or narrow the range"
        );
    }
    if at_edge {
        warn!(lower = x1, upper = x2, "minimum appears to lie beyond the scanned range");
    }
    let origin = 0.5 * (x1 + x2);
    info!(parameter = ctx.poi_name(0), origin, probes, "bracketed profile minimum");
    Bracket { lower: x1, upper: x2, origin, probes, too_wide, at_edge }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Parameter, ParameterSet};
    use crate::scan::config::{PointRange, ProfilingPolicy};
    use crate::scan::point::VecSink;
    use crate::scan::test_support::{Fixture, ScanModel};

    #[test]
    // Purpose
    // -------
    // On a strictly convex profile the bracket closes around the minimum and
    // stays inside the bounds.
    //
    // Given
    // -----
    // - 1-D profile `½(x − 1)²` on [-2, 4] with 60 points (precision 0.1).
    //
    // Expect
    // ------
    // - Bracket inside [-2, 4], origin within 0.1 of 1, every probe
    //   committed, no edge warning.
    fn bracket_converges_on_convex_profile() {
        // Arrange
        let mut fx = Fixture::one_dim(ScanModel::default());
        let mut sink = VecSink::new();
        let mut ctx = fx.open_context(&mut sink);

        // Act
        let bracket = ctx.scoped(|c| {
            c.fix_pois(true);
            bracket_minimum(c, 60)
        });
        drop(ctx);

        // Assert
        assert!(bracket.lower >= -2.0 && bracket.upper <= 4.0);
        assert!((bracket.origin - 1.0).abs() < 0.1, "origin = {}", bracket.origin);
        assert!(!bracket.at_edge);
        assert_eq!(sink.len(), bracket.probes);
    }

    #[test]
    // Purpose
    // -------
    // The range filter changes which probes are committed but not the
    // bracket itself.
    //
    // Given
    // -----
    // - The same search with range [0, 3].
    //
    // Expect
    // ------
    // - Identical bracket; exactly 4 committed probes.
    fn range_filter_does_not_change_bracket() {
        // Arrange
        let mut fx = Fixture::one_dim(ScanModel::default());
        let mut all = VecSink::new();
        let mut part = VecSink::new();

        // Act
        let full = fx.open_context(&mut all).scoped(|c| {
            c.fix_pois(true);
            bracket_minimum(c, 60)
        });
        let range = PointRange { first: Some(0), last: Some(3) };
        let partial = fx.context(&mut part, ProfilingPolicy::default(), range).scoped(|c| {
            c.fix_pois(true);
            bracket_minimum(c, 60)
        });

        // Assert
        assert_eq!(full, partial);
        assert_eq!(part.len(), 4);
        assert_eq!(part.points[..], all.points[..4]);
    }

    #[test]
    // Purpose
    // -------
    // A minimum outside the range is reported.
    //
    // Given
    // -----
    // - The scan model with `x` bounded to [-2, 0.5] (true minimum at 1).
    //
    // Expect
    // ------
    // - `at_edge == true`.
    fn minimum_beyond_range_is_flagged() {
        // Arrange
        let params = ParameterSet::new(vec![
            Parameter::interest("x", 0.5, -2.0, 0.5).unwrap(),
            Parameter::interest("y", -0.5, -4.0, 3.0).unwrap().fixed(),
            Parameter::nuisance("theta", 0.25, -5.0, 5.0).unwrap(),
        ])
        .unwrap();
        let mut fx = Fixture::from_parts(ScanModel::default(), params, vec![0], vec![2], 1);
        let mut sink = VecSink::new();

        // Act
        let bracket = fx.open_context(&mut sink).scoped(|c| {
            c.fix_pois(true);
            bracket_minimum(c, 40)
        });

        // Assert
        assert!(bracket.at_edge);
    }
}
