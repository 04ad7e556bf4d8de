//! scan::config — immutable scan configuration.
//!
//! Purpose
//! -------
//! Describe one scan run: which parameters to scan, which algorithm to use
//! (with its own options), which slice of the point sequence this job owns,
//! how profiling is performed, and which extra parameter values to record.
//!
//! Key behaviors
//! -------------
//! - [`ScanConfig`] is built in code (`ScanConfig::new`, `Default`, public
//!   fields) or parsed from TOML via [`ScanConfig::from_toml_str`].
//! - [`Algorithm`] is a tagged enum: each variant carries only the options it
//!   uses. It also parses from its short name with per-variant defaults.
//! - [`ScanConfig::validate`] rejects every invalid numeric option before any
//!   objective evaluation happens.
//!
//! Conventions
//! -----------
//! - TOML keys are kebab-case; the algorithm table is selected by its `name`
//!   key, e.g.
//!
//!   ```toml
//!   poi = ["r", "k"]
//!
//!   [algorithm]
//!   name = "grid"
//!   points = 400
//!
//!   [range]
//!   first = 0
//!   last = 199
//!   ```
//! - `save-parameters = ["all"]` records every nuisance parameter.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::optimization::profile_minimizer::{LineSearcher, MinimizerOptions, Tolerances};
use crate::scan::errors::{ScanError, ScanResult};

pub const DEFAULT_POINTS: usize = 50;
pub const DEFAULT_POWER: f64 = 0.5;
pub const DEFAULT_CL: f64 = 0.95;
pub const DEFAULT_CONTOUR_LEVEL: f64 = 1.15;
pub const DEFAULT_SECTORS: usize = 4;

/// Keyword in `save_parameters` selecting every nuisance parameter.
pub const SAVE_ALL: &str = "all";

fn default_points() -> usize {
    DEFAULT_POINTS
}

fn default_power() -> f64 {
    DEFAULT_POWER
}

fn default_cl() -> f64 {
    DEFAULT_CL
}

fn default_contour_level() -> f64 {
    DEFAULT_CONTOUR_LEVEL
}

fn default_sectors() -> usize {
    DEFAULT_SECTORS
}

/// Scan algorithm and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Algorithm {
    /// Global fit only; nothing is committed.
    None,
    /// Per-parameter profile-likelihood intervals.
    Singles {
        #[serde(default)]
        do95: bool,
    },
    /// Confidence box from threshold crossings on every axis.
    Cross {
        #[serde(default = "default_cl")]
        cl: f64,
    },
    Grid {
        #[serde(default = "default_points")]
        points: usize,
        #[serde(default = "default_power", rename = "distribution-power")]
        distribution_power: f64,
    },
    /// 2-D grid with neighbour refinement around the 1σ/2σ contours.
    Grid3x3 {
        #[serde(default = "default_points")]
        points: usize,
    },
    Random {
        #[serde(default = "default_points")]
        points: usize,
        #[serde(default)]
        seed: u64,
    },
    Contour2D {
        #[serde(default = "default_points")]
        points: usize,
        #[serde(default = "default_cl")]
        cl: f64,
    },
    Stitch2D {
        #[serde(default = "default_points")]
        points: usize,
        #[serde(default = "default_contour_level", rename = "contour-level")]
        contour_level: f64,
        #[serde(default = "default_sectors")]
        sectors: usize,
    },
    SmartScan {
        #[serde(default = "default_points")]
        points: usize,
        #[serde(default = "default_power", rename = "distribution-power")]
        distribution_power: f64,
    },
}

impl Algorithm {
    /// Short name, as accepted by `FromStr` and the TOML `name` key.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::None => "none",
            Algorithm::Singles { .. } => "singles",
            Algorithm::Cross { .. } => "cross",
            Algorithm::Grid { .. } => "grid",
            Algorithm::Grid3x3 { .. } => "grid3x3",
            Algorithm::Random { .. } => "random",
            Algorithm::Contour2D { .. } => "contour2d",
            Algorithm::Stitch2D { .. } => "stitch2d",
            Algorithm::SmartScan { .. } => "smartscan",
        }
    }

    /// Required number of scanned parameters, if the algorithm fixes one.
    pub fn required_dimension(&self) -> Option<usize> {
        match self {
            Algorithm::Grid3x3 { .. } | Algorithm::Contour2D { .. } | Algorithm::Stitch2D { .. } => {
                Some(2)
            }
            _ => None,
        }
    }

    fn validate(&self) -> ScanResult<()> {
        match *self {
            Algorithm::None | Algorithm::Singles { .. } => Ok(()),
            Algorithm::Cross { cl } => validate_cl(cl),
            Algorithm::Grid { points, distribution_power }
            | Algorithm::SmartScan { points, distribution_power } => {
                validate_points(points)?;
                validate_power(distribution_power)
            }
            Algorithm::Grid3x3 { points } | Algorithm::Random { points, .. } => {
                validate_points(points)
            }
            Algorithm::Contour2D { points, cl } => {
                validate_points(points)?;
                validate_cl(cl)
            }
            Algorithm::Stitch2D { points, contour_level, sectors } => {
                validate_points(points)?;
                if sectors == 0 {
                    return Err(ScanError::InvalidSectors { sectors });
                }
                if points < sectors {
                    return Err(ScanError::InvalidPointBudget {
                        points,
                        reason: "Stitching needs at least one point per sector.",
                    });
                }
                if !(contour_level.is_finite() && contour_level > 0.0) {
                    return Err(ScanError::InvalidContourLevel { level: contour_level });
                }
                Ok(())
            }
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::None
    }
}

impl FromStr for Algorithm {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let algorithm = match s.to_lowercase().as_str() {
            "none" => Algorithm::None,
            "singles" => Algorithm::Singles { do95: false },
            "cross" => Algorithm::Cross { cl: DEFAULT_CL },
            "grid" => Algorithm::Grid { points: DEFAULT_POINTS, distribution_power: DEFAULT_POWER },
            "grid3x3" => Algorithm::Grid3x3 { points: DEFAULT_POINTS },
            "random" => Algorithm::Random { points: DEFAULT_POINTS, seed: 0 },
            "contour2d" => Algorithm::Contour2D { points: DEFAULT_POINTS, cl: DEFAULT_CL },
            "stitch2d" => Algorithm::Stitch2D {
                points: DEFAULT_POINTS,
                contour_level: DEFAULT_CONTOUR_LEVEL,
                sectors: DEFAULT_SECTORS,
            },
            "smartscan" => {
                Algorithm::SmartScan { points: DEFAULT_POINTS, distribution_power: DEFAULT_POWER }
            }
            _ => return Err(ScanError::UnknownAlgorithm { name: s.to_string() }),
        };
        Ok(algorithm)
    }
}

fn validate_points(points: usize) -> ScanResult<()> {
    if points == 0 {
        return Err(ScanError::InvalidPointBudget {
            points,
            reason: "Point budget must be positive.",
        });
    }
    Ok(())
}

fn validate_cl(cl: f64) -> ScanResult<()> {
    if !(cl > 0.0 && cl < 1.0) {
        return Err(ScanError::InvalidConfidenceLevel { cl });
    }
    Ok(())
}

fn validate_power(power: f64) -> ScanResult<()> {
    if !(power.is_finite() && power > 0.0) {
        return Err(ScanError::InvalidPower { power });
    }
    Ok(())
}

/// Inclusive slice `[first, last]` of the global point index owned by a job.
///
/// Missing ends are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointRange {
    #[serde(default)]
    pub first: Option<usize>,
    #[serde(default)]
    pub last: Option<usize>,
}

impl PointRange {
    pub fn new(first: Option<usize>, last: Option<usize>) -> ScanResult<Self> {
        let range = Self { first, last };
        range.validate()?;
        Ok(range)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.first.map_or(true, |f| index >= f) && self.last.map_or(true, |l| index <= l)
    }

    fn validate(&self) -> ScanResult<()> {
        if let (Some(first), Some(last)) = (self.first, self.last) {
            if first > last {
                return Err(ScanError::InvalidRange { first, last });
            }
        }
        Ok(())
    }
}

/// When the local optimizer runs at a scan point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProfilingPolicy {
    /// Never profile; report the unprofiled objective everywhere.
    #[serde(default)]
    pub fast_scan: bool,
    /// Skip profiling where the unprofiled `deltaNLL` already exceeds this.
    #[serde(default)]
    pub max_delta_nll_for_prof: Option<f64>,
}

/// Serializable minimizer settings, converted into [`MinimizerOptions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct MinimizerSettings {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
    pub line_search: String,
    pub lbfgs_mem: Option<usize>,
    pub verbose: bool,
}

impl Default for MinimizerSettings {
    fn default() -> Self {
        let opts = MinimizerOptions::default();
        Self {
            tol_grad: opts.tols.tol_grad,
            tol_cost: opts.tols.tol_cost,
            max_iter: opts.tols.max_iter,
            line_search: opts.line_searcher.name().to_string(),
            lbfgs_mem: opts.lbfgs_mem,
            verbose: opts.verbose,
        }
    }
}

impl MinimizerSettings {
    /// Validate and convert.
    ///
    /// # Errors
    /// Any tolerance, line-search, or memory error from the optimizer layer.
    pub fn to_options(&self) -> ScanResult<MinimizerOptions> {
        let tols = Tolerances::new(self.tol_grad, self.tol_cost, self.max_iter)?;
        let line_searcher = LineSearcher::from_str(&self.line_search)?;
        Ok(MinimizerOptions::new(tols, line_searcher, self.verbose, self.lbfgs_mem)?)
    }
}

/// Full configuration of one scan job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Scanned parameter names; empty means every parameter of interest.
    pub poi: Vec<String>,
    pub algorithm: Algorithm,
    pub range: PointRange,
    /// Let non-scanned parameters of interest float instead of fixing them.
    pub float_other_pois: bool,
    pub profiling: ProfilingPolicy,
    /// Extra parameters whose values are copied into every committed point.
    pub save_parameters: Vec<String>,
    /// Also record non-scanned parameters of interest.
    pub save_inactive_poi: bool,
    pub minimizer: MinimizerSettings,
}

impl ScanConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// - [`ScanError::Config`] for syntax errors, unknown keys or algorithms.
    /// - Any validation error from [`ScanConfig::validate`].
    pub fn from_toml_str(text: &str) -> ScanResult<Self> {
        let config: ScanConfig =
            toml::from_str(text).map_err(|e| ScanError::Config { reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric option.
    pub fn validate(&self) -> ScanResult<()> {
        self.algorithm.validate()?;
        self.range.validate()?;
        if let Some(ceiling) = self.profiling.max_delta_nll_for_prof {
            if !(ceiling.is_finite() && ceiling >= 0.0) {
                return Err(ScanError::InvalidProfilingCeiling { ceiling });
            }
        }
        self.minimizer.to_options()?;
        Ok(())
    }
}
