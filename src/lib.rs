//! likelihood_scan — profile-likelihood scans, confidence boxes, and contours.
//!
//! Purpose
//! -------
//! Explore a negative log-likelihood over a few parameters of interest: find
//! the global best fit, evaluate the profiled objective at grids, random
//! draws, or adaptively placed points, bound confidence regions axis by
//! axis, and trace 2-D contours. Every evaluated point is reported relative
//! to the best fit with its χ² probability.
//!
//! Key behaviors
//! -------------
//! - [`model`]: bounded, named parameters with constant flags, snapshots and
//!   scoped restoration, and the [`NegLogLikelihood`](model::NegLogLikelihood)
//!   seam implemented by user models.
//! - [`optimization`]: an argmin L-BFGS minimizer that profiles the free
//!   parameters, in constrained or unconstrained mode.
//! - [`statistics`]: χ² survival and quantile conversions.
//! - [`scan`]: the scan driver and algorithms, configured by an immutable
//!   [`ScanConfig`](scan::ScanConfig) and reporting to a
//!   [`ResultSink`](scan::ResultSink).
//!
//! Invariants & assumptions
//! ------------------------
//! - Scans are single-threaded and mutate the evaluator's parameter state;
//!   parallelism comes from running independent jobs over disjoint point
//!   index ranges.
//! - Numerical trouble at a single point never aborts a scan; only invalid
//!   configuration and structural misuse are returned as errors.
//!
//! Conventions
//! -----------
//! - `deltaNLL` is the (profiled) objective minus the best-fit value; its
//!   probability is `P(χ²_dof ≥ 2·deltaNLL)`.
//! - Progress is reported through `tracing`; the crate never installs a
//!   subscriber.
//!
//! Downstream usage
//! ----------------
//! ```ignore
//! use likelihood_scan::prelude::*;
//!
//! let mut eval = NllEvaluator::new(model, data, params);
//! let config = ScanConfig::from_toml_str(text)?;
//! let mut sink = VecSink::new();
//! let summary = run_profile_scan(&config, &mut eval, &mut sink)?;
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; `tests/integration_scan_pipeline.rs`
//!   drives complete scans through the public API.

pub mod model;
pub mod optimization;
pub mod scan;
pub mod statistics;

pub mod prelude {
    pub use crate::model::{
        NegLogLikelihood, NllEvaluator, Parameter, ParameterRole, ParameterSet,
    };
    pub use crate::optimization::prelude::*;
    pub use crate::scan::{
        Algorithm, PointRange, PointStatus, ProfilingPolicy, ResultSink, ScanConfig, ScanError,
        ScanOutput, ScanPoint, ScanResult, ScanSummary, VecSink, run_profile_scan, run_scan,
    };
}
