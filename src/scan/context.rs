//! scan::context — shared state and the per-point evaluation rule.
//!
//! Purpose
//! -------
//! Bundle everything a scan algorithm needs (the evaluator, the local
//! minimizer, the result sink, the scanned and recorded parameters, the best
//! fit) and implement the one rule every algorithm uses to turn a coordinate
//! vector into a committed [`ScanPoint`].
//!
//! Key behaviors
//! -------------
//! - [`ScanContext::evaluate_point`] restores the best-fit values, moves the
//!   scanned parameters to the requested coordinates, and evaluates:
//!   1. a failed unprofiled evaluation yields [`PointStatus::Invalid`];
//!   2. fast scan, or an unprofiled `deltaNLL` above the profiling ceiling,
//!      yields [`PointStatus::Unprofiled`];
//!   3. otherwise the free parameters are profiled; a failed profile is
//!      rolled back and yields [`PointStatus::NotConverged`] with the
//!      unprofiled value.
//! - [`ScanContext::commit`] is the single place where points are built:
//!   coordinates and auxiliary values are read from the current parameter
//!   state.
//! - [`ScanContext::scoped`] runs a closure under a [`ParameterGuard`], so a
//!   component's parameter changes are undone on every exit path.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scanned parameters are held constant by the caller while points are
//!   evaluated; only their values are moved here.
//! - `nll0` is the objective at the best-fit snapshot.
use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{
    HoldsParameters, NegLogLikelihood, NllEvaluator, ParameterGuard, ParameterSet,
    ParameterSnapshot,
};
use crate::optimization::profile_minimizer::{LocalMinimizer, MinimizerMode};
use crate::scan::{
    config::{PointRange, ProfilingPolicy},
    point::{PointStatus, ResultSink, ScanPoint},
};
use crate::statistics::{INVALID_DELTA_NLL, crossing_threshold, p_value};

/// Outcome of the per-point rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointEval {
    pub delta_nll: f64,
    pub status: PointStatus,
}

impl PointEval {
    pub fn invalid() -> Self {
        Self { delta_nll: INVALID_DELTA_NLL, status: PointStatus::Invalid }
    }

    pub fn is_valid(&self) -> bool {
        self.status != PointStatus::Invalid
    }
}

/// Resolved scan layout handed to [`ScanContext::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSetup {
    /// Parameter-set indices of the scanned parameters, in scan order.
    pub poi: Vec<usize>,
    /// Parameter-set indices copied into every committed point.
    pub aux: Vec<usize>,
    /// Objective at the best fit.
    pub nll0: f64,
    /// Degrees of freedom for p-values: scanned plus floating other POIs.
    pub dof: usize,
    pub policy: ProfilingPolicy,
    pub range: PointRange,
}

pub struct ScanContext<'s, M: NegLogLikelihood> {
    eval: &'s mut NllEvaluator<M>,
    minimizer: &'s dyn LocalMinimizer<M>,
    sink: &'s mut dyn ResultSink,
    setup: ScanSetup,
    best_fit: ParameterSnapshot,
    committed: usize,
}

impl<'s, M: NegLogLikelihood> ScanContext<'s, M> {
    /// The current parameter state is taken as the best fit.
    pub fn new(
        eval: &'s mut NllEvaluator<M>, minimizer: &'s dyn LocalMinimizer<M>,
        sink: &'s mut dyn ResultSink, setup: ScanSetup,
    ) -> Self {
        let best_fit = eval.parameters().snapshot();
        Self { eval, minimizer, sink, setup, best_fit, committed: 0 }
    }

    // ---- Accessors ----

    pub fn nll0(&self) -> f64 {
        self.setup.nll0
    }

    pub fn dof(&self) -> usize {
        self.setup.dof
    }

    /// Number of scanned parameters.
    pub fn dimension(&self) -> usize {
        self.setup.poi.len()
    }

    pub fn policy(&self) -> ProfilingPolicy {
        self.setup.policy
    }

    pub fn range(&self) -> PointRange {
        self.setup.range
    }

    pub fn in_range(&self, index: usize) -> bool {
        self.setup.range.contains(index)
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn best_fit(&self) -> &ParameterSnapshot {
        &self.best_fit
    }

    pub fn parameters(&self) -> &ParameterSet {
        self.eval.parameters()
    }

    /// Name of scanned parameter `k`.
    pub fn poi_name(&self, k: usize) -> &str {
        self.eval.parameters().get(self.setup.poi[k]).map_or("", |p| p.name.as_str())
    }

    /// `(lower, upper)` bounds of scanned parameter `k`.
    pub fn poi_bounds(&self, k: usize) -> (f64, f64) {
        self.eval
            .parameters()
            .get(self.setup.poi[k])
            .map_or((f64::NAN, f64::NAN), |p| (p.lower, p.upper))
    }

    /// Best-fit value of scanned parameter `k`.
    pub fn poi_best_fit(&self, k: usize) -> f64 {
        self.best_fit.value(self.setup.poi[k]).unwrap_or(f64::NAN)
    }

    /// Current values of the scanned parameters.
    pub fn poi_values(&self) -> Vec<f64> {
        let params = self.eval.parameters();
        self.setup.poi.iter().filter_map(|&i| params.get(i)).map(|p| p.value).collect()
    }

    pub fn p_value(&self, delta_nll: f64) -> f64 {
        p_value(delta_nll, self.setup.dof)
    }

    /// Objective value at which a profile leaves the `cl` region with `dof`
    /// degrees of freedom.
    pub fn threshold(&self, cl: f64, dof: usize) -> f64 {
        crossing_threshold(self.setup.nll0, cl, dof)
    }

    // ---- State manipulation ----

    /// Run `f` with the parameter state restored afterwards.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = ParameterGuard::new(self);
        f(&mut guard)
    }

    /// Put every value back to the best fit; constant flags are untouched.
    pub fn restore_best_fit(&mut self) {
        self.eval.parameters_mut().restore_values(&self.best_fit);
    }

    pub fn restore_values(&mut self, snapshot: &ParameterSnapshot) {
        self.eval.parameters_mut().restore_values(snapshot);
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        self.eval.parameters().snapshot()
    }

    /// Hold (or release) every scanned parameter.
    pub fn fix_pois(&mut self, constant: bool) {
        for k in 0..self.setup.poi.len() {
            self.fix_poi(k, constant);
        }
    }

    pub fn fix_poi(&mut self, k: usize, constant: bool) {
        let i = self.setup.poi[k];
        self.eval.parameters_mut().set_constant(i, constant);
    }

    /// Move scanned parameter `k`, clamped to its bounds.
    pub fn set_poi(&mut self, k: usize, value: f64) {
        let i = self.setup.poi[k];
        self.eval.parameters_mut().set_value(i, value);
    }

    pub fn set_pois(&mut self, coords: &[f64]) {
        for (k, &v) in coords.iter().enumerate().take(self.setup.poi.len()) {
            self.set_poi(k, v);
        }
    }

    // ---- Evaluation ----

    /// Objective at the current state, or `None` if the evaluation failed.
    pub fn nll_here(&mut self) -> Option<f64> {
        self.eval.clear_eval_error_log();
        let nll = self.eval.evaluate();
        if self.eval.num_eval_errors() > 0 || !nll.is_finite() {
            return None;
        }
        Some(nll)
    }

    /// Run the minimizer and leave the parameters wherever it stopped.
    pub fn minimize_here(&mut self, mode: MinimizerMode) -> bool {
        self.minimizer.minimize(self.eval, mode)
    }

    /// Profile the free parameters and return the objective afterwards.
    ///
    /// A failed minimization or evaluation rolls the state back to where it
    /// was on entry and returns `None`.
    pub fn profile_here(&mut self, mode: MinimizerMode) -> Option<f64> {
        let entry = self.snapshot();
        if self.minimizer.minimize(self.eval, mode) {
            if let Some(nll) = self.nll_here() {
                return Some(nll);
            }
        }
        self.restore_values(&entry);
        None
    }

    /// Profiled objective where possible, unprofiled otherwise; `+∞` if the
    /// point cannot be evaluated at all.
    pub fn profiled_or_unprofiled(&mut self, mode: MinimizerMode) -> f64 {
        if let Some(nll) = self.profile_here(mode) {
            return nll;
        }
        self.nll_here().unwrap_or(f64::INFINITY)
    }

    /// Apply the per-point rule at the current parameter state.
    pub fn evaluate_here(&mut self) -> PointEval {
        let Some(nll) = self.nll_here() else {
            return PointEval::invalid();
        };
        let unprofiled = nll - self.setup.nll0;
        let policy = self.setup.policy;
        let above_ceiling = policy.max_delta_nll_for_prof.is_some_and(|c| unprofiled > c);
        if policy.fast_scan || above_ceiling {
            return PointEval { delta_nll: unprofiled, status: PointStatus::Unprofiled };
        }
        match self.profile_here(MinimizerMode::Constrained) {
            Some(profiled) => {
                PointEval { delta_nll: profiled - self.setup.nll0, status: PointStatus::Profiled }
            }
            None => {
                debug!(delta_nll = unprofiled, "profiling failed, reporting unprofiled value");
                PointEval { delta_nll: unprofiled, status: PointStatus::NotConverged }
            }
        }
    }

    /// Restore the best fit, move to `coords`, and apply the per-point rule.
    pub fn evaluate_point(&mut self, coords: &[f64]) -> PointEval {
        self.restore_best_fit();
        self.set_pois(coords);
        self.evaluate_here()
    }

    /// Evaluate and commit point `index` if it lies in this job's range.
    pub fn scan_point(&mut self, index: usize, coords: &[f64]) -> Option<PointEval> {
        if !self.in_range(index) {
            return None;
        }
        let eval = self.evaluate_point(coords);
        self.commit_eval(eval);
        Some(eval)
    }

    /// Always evaluate; commit only when `index` is in range.
    ///
    /// Used where the evaluated value steers later points (bracketing), so
    /// that every job reproduces the same decisions.
    pub fn probe(&mut self, index: usize, coords: &[f64]) -> PointEval {
        let eval = self.evaluate_point(coords);
        if self.in_range(index) {
            self.commit_eval(eval);
        }
        eval
    }

    // ---- Commit ----

    /// Commit a rule outcome with its χ² probability (0 for invalid points).
    pub fn commit_eval(&mut self, eval: PointEval) {
        let quantile = if eval.is_valid() { self.p_value(eval.delta_nll) } else { 0.0 };
        self.commit(eval.delta_nll, quantile, eval.status);
    }

    /// Build a point from the current parameter state and hand it to the sink.
    pub fn commit(&mut self, delta_nll: f64, quantile: f64, status: PointStatus) {
        let params = self.eval.parameters();
        let auxiliary: BTreeMap<String, f64> = self
            .setup
            .aux
            .iter()
            .filter_map(|&i| params.get(i))
            .map(|p| (p.name.clone(), p.value))
            .collect();
        let point = ScanPoint { coordinates: self.poi_values(), delta_nll, quantile, auxiliary, status };
        debug!(coordinates = ?point.coordinates, delta_nll, ?status, "commit");
        self.sink.commit(point);
        self.committed += 1;
    }
}

impl<M: NegLogLikelihood> HoldsParameters for ScanContext<'_, M> {
    fn parameter_set(&self) -> &ParameterSet {
        self.eval.parameters()
    }

    fn parameter_set_mut(&mut self) -> &mut ParameterSet {
        self.eval.parameters_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::point::VecSink;
    use crate::scan::test_support::{Fixture, ScanModel};

    #[test]
    // Purpose
    // -------
    // A profiled point reports the profile of the nuisance parameter and its
    // χ² probability.
    //
    // Given
    // -----
    // - Scan model with `x, y` scanned at `(2, -0.5)`; θ profiles to `0.5x`.
    //
    // Expect
    // ------
    // - `deltaNLL ≈ 0.5`, status `Profiled`, quantile `P(χ²₂ ≥ 1)`.
    fn evaluate_point_profiles_nuisance() {
        // Arrange
        let mut fx = Fixture::new(ScanModel::default());
        let mut sink = VecSink::new();
        let mut ctx = fx.context(&mut sink, ProfilingPolicy::default(), PointRange::default());
        ctx.fix_pois(true);

        // Act
        let eval = ctx.scan_point(0, &[2.0, -0.5]);
        drop(ctx);

        // Assert
        let eval = eval.unwrap();
        assert_eq!(eval.status, PointStatus::Profiled);
        assert!((eval.delta_nll - 0.5).abs() < 1e-6, "delta = {}", eval.delta_nll);
        let point = &sink.points[0];
        assert!((point.quantile - (-0.5_f64).exp()).abs() < 1e-6);
        assert_eq!(point.coordinates, vec![2.0, -0.5]);
        assert!((point.auxiliary["theta"] - 1.0).abs() < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Fast scan and the profiling ceiling both report the unprofiled value.
    //
    // Given
    // -----
    // - The same point with `fast_scan`, then with ceiling 0.1.
    //
    // Expect
    // ------
    // - Status `Unprofiled` and `deltaNLL = 0.5 + 2·(0.5 - 1)² = 1.0` since θ
    //   stays at its best-fit value 0.5.
    fn fast_scan_and_ceiling_skip_profiling() {
        // Arrange
        let mut fx = Fixture::new(ScanModel::default());
        let mut sink = VecSink::new();
        let fast = ProfilingPolicy { fast_scan: true, max_delta_nll_for_prof: None };
        let capped = ProfilingPolicy { fast_scan: false, max_delta_nll_for_prof: Some(0.1) };

        // Act
        let mut ctx = fx.context(&mut sink, fast, PointRange::default());
        let a = ctx.scoped(|c| {
            c.fix_pois(true);
            c.evaluate_point(&[2.0, -0.5])
        });
        drop(ctx);
        let mut ctx = fx.context(&mut sink, capped, PointRange::default());
        let b = ctx.scoped(|c| {
            c.fix_pois(true);
            c.evaluate_point(&[2.0, -0.5])
        });

        // Assert
        assert_eq!(a.status, PointStatus::Unprofiled);
        assert_eq!(b.status, PointStatus::Unprofiled);
        assert!((a.delta_nll - 1.0).abs() < 1e-9, "delta = {}", a.delta_nll);
        assert_eq!(a.delta_nll, b.delta_nll);
    }

    #[test]
    // Purpose
    // -------
    // Failed evaluations are committed with the sentinel and zero quantile.
    //
    // Given
    // -----
    // - A model that refuses `x > 2.5`; the point `x = 3`.
    //
    // Expect
    // ------
    // - Status `Invalid`, `deltaNLL = 9999`, quantile 0.
    fn invalid_points_commit_sentinel() {
        // Arrange
        let mut fx = Fixture::new(ScanModel { refuse_above: Some(2.5), ..ScanModel::default() });
        let mut sink = VecSink::new();
        let mut ctx = fx.context(&mut sink, ProfilingPolicy::default(), PointRange::default());
        ctx.fix_pois(true);

        // Act
        ctx.scan_point(0, &[3.0, 0.0]);
        drop(ctx);

        // Assert
        let p = &sink.points[0];
        assert_eq!(p.status, PointStatus::Invalid);
        assert_eq!(p.delta_nll, INVALID_DELTA_NLL);
        assert_eq!(p.quantile, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // `scoped` undoes value and constant-flag changes; out-of-range indices
    // are neither evaluated nor committed.
    //
    // Given
    // -----
    // - A scoped block that fixes the POIs and moves `x`.
    // - Range `[5, 9]` and index 2.
    //
    // Expect
    // ------
    // - Parameters back at the best fit with their flags; nothing committed.
    fn scoped_restores_state_and_range_filters() {
        // Arrange
        let mut fx = Fixture::new(ScanModel::default());
        let before = fx.eval.parameters().snapshot();
        let mut sink = VecSink::new();
        let range = PointRange { first: Some(5), last: Some(9) };
        let mut ctx = fx.context(&mut sink, ProfilingPolicy::default(), range);

        // Act
        let out = ctx.scoped(|c| {
            c.fix_pois(true);
            c.set_poi(0, 2.7);
            c.scan_point(2, &[2.0, 0.0])
        });
        let after = ctx.snapshot();
        drop(ctx);

        // Assert
        assert!(out.is_none());
        assert!(sink.is_empty());
        assert_eq!(after, before);
    }

    /// Moves θ away from its profile and reports failure.
    struct Stalls;

    impl LocalMinimizer<ScanModel> for Stalls {
        fn minimize(&self, evaluator: &mut NllEvaluator<ScanModel>, _: MinimizerMode) -> bool {
            evaluator.parameters_mut().set_value(2, 4.0);
            false
        }
    }

    #[test]
    // Purpose
    // -------
    // A minimizer that fails rolls the nuisance parameters back and the point
    // is committed with its unprofiled value and χ² probability.
    //
    // Given
    // -----
    // - Scan model at `(2, -0.5)` with θ at its best-fit value 0.5 and a
    //   minimizer that moves θ to 4 before reporting failure.
    //
    // Expect
    // ------
    // - Status `NotConverged`, `deltaNLL = 1.0` (unprofiled), quantile
    //   `P(χ²₂ ≥ 2) = e⁻¹`, θ recorded as 0.5.
    fn failed_profile_commits_unprofiled_value() {
        // Arrange
        let mut fx = Fixture::new(ScanModel::default());
        let nll0 = fx.eval.evaluate();
        let setup = ScanSetup {
            poi: fx.poi.clone(),
            aux: fx.aux.clone(),
            nll0,
            dof: fx.dof,
            policy: ProfilingPolicy::default(),
            range: PointRange::default(),
        };
        let mut sink = VecSink::new();
        let mut ctx = ScanContext::new(&mut fx.eval, &Stalls, &mut sink, setup);
        ctx.fix_pois(true);

        // Act
        let eval = ctx.scan_point(0, &[2.0, -0.5]);
        drop(ctx);

        // Assert
        let eval = eval.unwrap();
        assert_eq!(eval.status, PointStatus::NotConverged);
        assert!((eval.delta_nll - 1.0).abs() < 1e-12, "delta = {}", eval.delta_nll);
        let point = &sink.points[0];
        assert_eq!(point.status, PointStatus::NotConverged);
        assert!((point.quantile - (-1.0_f64).exp()).abs() < 1e-9);
        assert_eq!(point.auxiliary["theta"], 0.5);
    }
}
