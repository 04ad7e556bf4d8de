use thiserror::Error;

use crate::model::ModelError;
use crate::optimization::errors::OptError;

/// Result alias for scan configuration and driver operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Unrecoverable, caller-visible scan errors.
///
/// Numerical trouble during a scan (failed evaluations, non-convergent
/// profiles, missing crossings) is never an error: it is recorded on the
/// committed points and logged. Only misuse and invalid configuration end up
/// here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    // ---- Structure ----
    #[error("Unknown algorithm '{name}'")]
    UnknownAlgorithm { name: String },

    #[error("Unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Parameter '{name}' is not a parameter of interest")]
    NotAParameterOfInterest { name: String },

    /// Contour algorithms need exactly two scanned parameters.
    #[error("Algorithm '{algorithm}' requires {expected} parameters of interest, found {found}")]
    WrongDimension { algorithm: &'static str, expected: usize, found: usize },

    #[error("No parameters of interest to scan")]
    NoParameters,

    // ---- Numeric options ----
    #[error("Invalid point budget {points}: {reason}")]
    InvalidPointBudget { points: usize, reason: &'static str },

    #[error("Invalid index range [{first}, {last}]: first index exceeds last")]
    InvalidRange { first: usize, last: usize },

    #[error("Invalid confidence level {cl}: must lie strictly between 0 and 1")]
    InvalidConfidenceLevel { cl: f64 },

    #[error("Invalid contour level {level}: must be finite and positive")]
    InvalidContourLevel { level: f64 },

    #[error("Invalid distribution power {power}: must be finite and positive")]
    InvalidPower { power: f64 },

    #[error("Invalid sector count {sectors}: at least one sector is required")]
    InvalidSectors { sectors: usize },

    #[error("Invalid profiling ceiling {ceiling}: must be finite and non-negative")]
    InvalidProfilingCeiling { ceiling: f64 },

    #[error("Invalid bounds for '{name}': [{lower}, {upper}] has no width")]
    InvalidBounds { name: String, lower: f64, upper: f64 },

    // ---- Best fit ----
    #[error("Global fit produced a non-finite objective value {value}")]
    NonFiniteBestFit { value: f64 },

    // ---- Wrapped ----
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Optimizer(#[from] OptError),

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}
