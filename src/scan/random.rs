//! Uniformly random points inside the box of scanned-parameter bounds.
//!
//! Every job draws the whole sequence from the same seed, so draw `i` is the
//! same point in every job and the range filter selects by draw index.
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use crate::model::NegLogLikelihood;
use crate::scan::context::ScanContext;

pub fn scan_random<M: NegLogLikelihood>(ctx: &mut ScanContext<'_, M>, points: usize, seed: u64) {
    let bounds: Vec<(f64, f64)> = (0..ctx.dimension()).map(|k| ctx.poi_bounds(k)).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    info!(points, seed, "random scan");
    ctx.scoped(|c| {
        c.fix_pois(true);
        for i in 0..points {
            let coords: Vec<f64> = bounds
                .iter()
                .map(|&(lo, hi)| if hi > lo { rng.random_range(lo..hi) } else { lo })
                .collect();
            c.scan_point(i, &coords);
        }
    });
}
