//! Committed scan points and the sink they are delivered to.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a committed point's `delta_nll` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointStatus {
    /// The global best fit.
    BestFit,
    /// Nuisance parameters were re-optimized at this point.
    Profiled,
    /// Profiling was skipped (fast scan or above the profiling ceiling).
    Unprofiled,
    /// Profiling failed; the unprofiled value is reported.
    NotConverged,
    /// Evaluation failed; `delta_nll` is the sentinel 9999.
    Invalid,
    /// A threshold crossing found by bisection.
    Crossing,
    /// No crossing inside the range; the point sits on the axis limit.
    RangeEdge,
    /// A point of a traced contour, reported at the contour level.
    ContourPoint,
}

/// One committed point. Immutable once handed to a [`ResultSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    /// Scanned parameter values, in scan order.
    pub coordinates: Vec<f64>,
    pub delta_nll: f64,
    /// Probability `P(χ²_dof ≥ 2·deltaNLL)` or the point's nominal quantile.
    pub quantile: f64,
    /// Values of the recorded auxiliary parameters.
    pub auxiliary: BTreeMap<String, f64>,
    pub status: PointStatus,
}

/// Append-only, ordered destination for committed points.
pub trait ResultSink {
    fn commit(&mut self, point: ScanPoint);
}

/// In-memory sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VecSink {
    pub points: Vec<ScanPoint>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<ScanPoint> {
        self.points
    }

    /// Points with the given status, in commit order.
    pub fn with_status(&self, status: PointStatus) -> impl Iterator<Item = &ScanPoint> {
        self.points.iter().filter(move |p| p.status == status)
    }
}

impl ResultSink for VecSink {
    fn commit(&mut self, point: ScanPoint) {
        self.points.push(point);
    }
}
