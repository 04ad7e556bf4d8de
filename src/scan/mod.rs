//! scan — likelihood scans over parameters of interest.
//!
//! Purpose
//! -------
//! Explore the (profiled) objective over a handful of scanned parameters and
//! report every evaluated point relative to the global best fit, together
//! with its χ² probability.
//!
//! Key behaviors
//! -------------
//! - [`run_scan`] resolves parameters, performs the global fit, and
//!   dispatches to one algorithm:
//!   - `singles`: 68% / 95% profile intervals per parameter ([`singles`]);
//!   - `cross`: a confidence box from threshold crossings ([`boxes`]);
//!   - `grid`, `grid3x3`: regular grids in 1, 2, or N dimensions ([`grid`]);
//!   - `random`: seeded uniform draws inside the bounds ([`random`]);
//!   - `contour2d`: slice-wise crossings of a 2-D contour ([`contour`]);
//!   - `stitch2d`: polar marching along a 2-D contour ([`stitch`]);
//!   - `smartscan`: N-D neighbourhood of the best fit ([`smart`]).
//! - Every point goes through one rule in [`context`]: invalid evaluations
//!   get the sentinel `deltaNLL = 9999`, fast scan and the profiling ceiling
//!   skip profiling, and failed profiles fall back to the unprofiled value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Algorithms mutate the shared parameter state only inside scoped guards;
//!   the caller's state is restored when a scan returns.
//! - A [`PointRange`] selects which global point indices a job evaluates, so
//!   independent jobs over disjoint ranges merge into the unpartitioned scan.
//!
//! Testing notes
//! -------------
//! - Unit tests use analytic likelihoods with closed-form profiles (see the
//!   private `test_support` module); the end-to-end pipeline is covered in
//!   `tests/integration_scan_pipeline.rs`.

pub mod boxes;
pub mod bracket;
pub mod config;
pub mod context;
pub mod contour;
pub mod crossing;
pub mod distribution;
pub mod driver;
pub mod errors;
pub mod grid;
pub mod point;
pub mod random;
pub mod singles;
pub mod smart;
pub mod stitch;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::boxes::{AxisInterval, ThresholdBox};
pub use self::bracket::Bracket;
pub use self::config::{
    Algorithm, MinimizerSettings, PointRange, ProfilingPolicy, SAVE_ALL, ScanConfig,
};
pub use self::context::{PointEval, ScanContext, ScanSetup};
pub use self::crossing::CrossingOptions;
pub use self::distribution::{PointDistributor, Side};
pub use self::driver::{ScanOutput, ScanSummary, run_profile_scan, run_scan};
pub use self::errors::{ScanError, ScanResult};
pub use self::point::{PointStatus, ResultSink, ScanPoint, VecSink};
pub use self::singles::SinglesInterval;
pub use self::stitch::{Contour, ContourSector, ContourVertex};
