//! scan::driver — entry point tying configuration, best fit, and algorithms.
//!
//! Purpose
//! -------
//! Run one scan job end to end: resolve the scanned and recorded parameters,
//! perform the global best fit, commit the best-fit point, and dispatch to
//! the configured algorithm.
//!
//! Key behaviors
//! -------------
//! - Scanned parameters are taken from `config.poi`, or every parameter of
//!   interest when empty. Other parameters of interest are held constant
//!   unless `float_other_pois` is set, in which case the non-constant ones
//!   float and add to the degrees of freedom.
//! - `save_parameters` names are recorded in every point; `"all"` selects
//!   every nuisance parameter and `save_inactive_poi` adds the non-scanned
//!   parameters of interest.
//! - The global fit runs in constrained mode over every non-constant
//!   parameter. A failed fit is logged and the scan continues from the
//!   state it reached; a non-finite objective there is an error.
//! - The caller's parameter values and constant flags are restored when
//!   [`run_scan`] returns, on success and on error.
//!
//! Invariants & assumptions
//! ------------------------
//! - Configuration and structural errors are reported before the first
//!   objective evaluation.
//! - The best-fit point is committed by every job (it carries no index), with
//!   quantile 1, unless the algorithm is `none`.
//!
//! Downstream usage
//! ----------------
//! - Use [`run_profile_scan`] for the built-in L-BFGS profiler configured
//!   from `config.minimizer`, or [`run_scan`] to supply another
//!   [`LocalMinimizer`].
use tracing::{info, warn};

use crate::model::{NegLogLikelihood, NllEvaluator, ParameterGuard, ParameterRole, ParameterSet};
use crate::optimization::profile_minimizer::{LocalMinimizer, MinimizerMode, ProfileMinimizer};
use crate::scan::{
    boxes::{ThresholdBox, build_box},
    bracket::Bracket,
    config::{Algorithm, SAVE_ALL, ScanConfig},
    context::{ScanContext, ScanSetup},
    contour::scan_contour,
    errors::{ScanError, ScanResult},
    grid::{scan_grid, scan_grid_3x3},
    point::{PointStatus, ResultSink},
    random::scan_random,
    singles::{SinglesInterval, scan_singles},
    smart::scan_smart,
    stitch::{Contour, scan_stitch},
};

/// Algorithm-specific result of a scan job.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutput {
    /// `none`: the global fit only.
    None,
    Intervals(Vec<SinglesInterval>),
    /// `cross`: the committed confidence box.
    Box(ThresholdBox),
    /// `contour2d`: the box used to place the slices.
    Contour2D(ThresholdBox),
    Stitch(Contour),
    /// `grid`: the minimum bracket of a 1-D scan with `power > 1`.
    Bracket(Option<Bracket>),
    /// Algorithms whose only output is the committed points.
    Points,
}

/// Summary of one scan job.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub poi: Vec<String>,
    /// Best-fit values of the scanned parameters.
    pub best_fit: Vec<f64>,
    pub nll0: f64,
    /// Degrees of freedom used for p-values.
    pub dof: usize,
    pub best_fit_converged: bool,
    /// Points handed to the sink, including the best fit.
    pub points_committed: usize,
    pub output: ScanOutput,
}

/// Run a scan with the built-in profile minimizer configured from
/// `config.minimizer`.
///
/// # Errors
/// As [`run_scan`], plus invalid minimizer settings.
pub fn run_profile_scan<M: NegLogLikelihood>(
    config: &ScanConfig, eval: &mut NllEvaluator<M>, sink: &mut dyn ResultSink,
) -> ScanResult<ScanSummary> {
    let minimizer = ProfileMinimizer::new(config.minimizer.to_options()?);
    run_scan(config, eval, &minimizer, sink)
}

/// Run one scan job.
///
/// # Errors
/// - Invalid configuration (see [`ScanConfig::validate`]).
/// - [`ScanError::UnknownParameter`], [`ScanError::NotAParameterOfInterest`],
///   [`ScanError::NoParameters`], [`ScanError::WrongDimension`], or
///   [`ScanError::InvalidBounds`] from parameter resolution.
/// - Model validation failures, and [`ScanError::NonFiniteBestFit`].
pub fn run_scan<M: NegLogLikelihood>(
    config: &ScanConfig, eval: &mut NllEvaluator<M>, minimizer: &dyn LocalMinimizer<M>,
    sink: &mut dyn ResultSink,
) -> ScanResult<ScanSummary> {
    config.validate()?;
    let mut guard = ParameterGuard::new(eval);
    let eval: &mut NllEvaluator<M> = &mut guard;

    let poi = resolve_poi(config, eval.parameters())?;
    if let Some(expected) = config.algorithm.required_dimension() {
        if poi.len() != expected {
            return Err(ScanError::WrongDimension {
                algorithm: config.algorithm.name(),
                expected,
                found: poi.len(),
            });
        }
    }
    let aux = resolve_aux(config, eval.parameters(), &poi)?;
    let other_floating = hold_other_pois(config, eval.parameters_mut(), &poi);
    let dof = poi.len() + other_floating;
    eval.check()?;

    // ---- Global fit ----
    let converged = minimizer.minimize(eval, MinimizerMode::Constrained);
    if !converged {
        warn!("global fit did not converge; scanning around the state it reached");
    }
    eval.clear_eval_error_log();
    let nll0 = eval.evaluate();
    if !nll0.is_finite() || eval.num_eval_errors() > 0 {
        return Err(ScanError::NonFiniteBestFit { value: nll0 });
    }
    let names: Vec<String> = poi
        .iter()
        .filter_map(|&i| eval.parameters().get(i))
        .map(|p| p.name.clone())
        .collect();
    let best_fit: Vec<f64> =
        poi.iter().filter_map(|&i| eval.parameters().get(i)).map(|p| p.value).collect();
    info!(
        algorithm = config.algorithm.name(),
        poi = ?names,
        best_fit = ?best_fit,
        nll0,
        dof,
        converged,
        "best fit"
    );

    let setup = ScanSetup {
        poi,
        aux,
        nll0,
        dof,
        policy: config.profiling,
        range: config.range,
    };
    let mut ctx = ScanContext::new(eval, minimizer, sink, setup);
    if config.algorithm != Algorithm::None {
        ctx.commit(0.0, 1.0, PointStatus::BestFit);
    }
    let output = dispatch(&config.algorithm, &mut ctx);
    let points_committed = ctx.committed();
    info!(algorithm = config.algorithm.name(), points_committed, "scan finished");

    Ok(ScanSummary {
        poi: names,
        best_fit,
        nll0,
        dof,
        best_fit_converged: converged,
        points_committed,
        output,
    })
}

fn dispatch<M: NegLogLikelihood>(algorithm: &Algorithm, ctx: &mut ScanContext<'_, M>) -> ScanOutput {
    match *algorithm {
        Algorithm::None => ScanOutput::None,
        Algorithm::Singles { do95 } => ScanOutput::Intervals(scan_singles(ctx, do95)),
        Algorithm::Cross { cl } => ScanOutput::Box(build_box(ctx, cl, true)),
        Algorithm::Grid { points, distribution_power } => {
            ScanOutput::Bracket(scan_grid(ctx, points, distribution_power))
        }
        Algorithm::Grid3x3 { points } => {
            scan_grid_3x3(ctx, points);
            ScanOutput::Points
        }
        Algorithm::Random { points, seed } => {
            scan_random(ctx, points, seed);
            ScanOutput::Points
        }
        Algorithm::Contour2D { points, cl } => ScanOutput::Contour2D(scan_contour(ctx, points, cl)),
        Algorithm::Stitch2D { points, contour_level, sectors } => {
            ScanOutput::Stitch(scan_stitch(ctx, points, contour_level, sectors))
        }
        Algorithm::SmartScan { points, distribution_power } => {
            scan_smart(ctx, points, distribution_power);
            ScanOutput::Points
        }
    }
}

fn resolve_poi(config: &ScanConfig, params: &ParameterSet) -> ScanResult<Vec<usize>> {
    let poi = if config.poi.is_empty() {
        params.indices_with_role(ParameterRole::Interest)
    } else {
        config
            .poi
            .iter()
            .map(|name| {
                let i = params
                    .index_of(name)
                    .ok_or_else(|| ScanError::UnknownParameter { name: name.clone() })?;
                match params.get(i) {
                    Some(p) if p.is_interest() => Ok(i),
                    _ => Err(ScanError::NotAParameterOfInterest { name: name.clone() }),
                }
            })
            .collect::<ScanResult<Vec<_>>>()?
    };
    if poi.is_empty() {
        return Err(ScanError::NoParameters);
    }
    for p in poi.iter().filter_map(|&i| params.get(i)) {
        if !(p.upper > p.lower) {
            return Err(ScanError::InvalidBounds {
                name: p.name.clone(),
                lower: p.lower,
                upper: p.upper,
            });
        }
    }
    Ok(poi)
}

fn resolve_aux(config: &ScanConfig, params: &ParameterSet, poi: &[usize]) -> ScanResult<Vec<usize>> {
    let mut aux: Vec<usize> = Vec::new();
    let mut push = |i: usize| {
        if !poi.contains(&i) && !aux.contains(&i) {
            aux.push(i);
        }
    };
    for name in &config.save_parameters {
        if name == SAVE_ALL {
            params.indices_with_role(ParameterRole::Nuisance).into_iter().for_each(&mut push);
        } else {
            let i = params
                .index_of(name)
                .ok_or_else(|| ScanError::UnknownParameter { name: name.clone() })?;
            push(i);
        }
    }
    if config.save_inactive_poi {
        params.indices_with_role(ParameterRole::Interest).into_iter().for_each(&mut push);
    }
    Ok(aux)
}

/// Fix the non-scanned parameters of interest, or count the floating ones.
fn hold_other_pois(config: &ScanConfig, params: &mut ParameterSet, poi: &[usize]) -> usize {
    let others: Vec<usize> = params
        .indices_with_role(ParameterRole::Interest)
        .into_iter()
        .filter(|i| !poi.contains(i))
        .collect();
    if config.float_other_pois {
        others.iter().filter(|&&i| params.get(i).is_some_and(|p| !p.constant)).count()
    } else {
        for i in others {
            params.set_constant(i, true);
        }
        0
    }
}
