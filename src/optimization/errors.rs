use argmin::core::{ArgminError, Error};
use thiserror::Error;

/// Result alias for minimizer and model-evaluation operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptError {
    // ---- Model ----
    /// The model has no analytic gradient; finite differences take over.
    #[error("Analytic gradient not implemented")]
    GradientNotImplemented,

    /// The model could not be evaluated at the requested point.
    #[error("Model evaluation failed: {reason}")]
    ModelEvaluation { reason: String },

    #[error("Non-finite objective value: {value}")]
    NonFiniteCost { value: f64 },

    #[error("Parameter vector length mismatch: expected {expected}, found {found}")]
    ThetaLengthMismatch { expected: usize, found: usize },

    // ---- Gradient ----
    #[error("Gradient length mismatch: expected {expected}, found {found}")]
    GradientDimMismatch { expected: usize, found: usize },

    #[error("Invalid gradient component {index} ({value}): {reason}")]
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Minimizer options ----
    #[error("Invalid gradient tolerance {tol}: {reason}")]
    InvalidTolGrad { tol: f64, reason: &'static str },

    #[error("Invalid cost-change tolerance {tol}: {reason}")]
    InvalidTolCost { tol: f64, reason: &'static str },

    #[error("Invalid iteration cap {max_iter}: {reason}")]
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// Neither a tolerance nor an iteration cap was given, so a run could
    /// never stop on its own terms.
    #[error("No stopping criterion provided")]
    NoTolerancesProvided,

    #[error("Invalid line search '{name}': {reason}")]
    InvalidLineSearch { name: String, reason: &'static str },

    #[error("Invalid L-BFGS memory {mem}: {reason}")]
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Solver result ----
    #[error("Profiled parameter {index} is {value}: {reason}")]
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    #[error("Solver finished without a best point")]
    MissingThetaHat,

    // ---- Backend ----
    /// An argmin error, tagged with its kind.
    #[error("Solver error ({kind}): {text}")]
    Solver { kind: &'static str, text: String },
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        // Our own cost and gradient errors travel through argmin boxed.
        let err = match err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(other) => other,
        };
        let (kind, text) = match err.downcast::<ArgminError>() {
            Ok(ArgminError::InvalidParameter { text }) => ("invalid parameter", text),
            Ok(ArgminError::NotImplemented { text }) => ("not implemented", text),
            Ok(ArgminError::NotInitialized { text }) => ("not initialized", text),
            Ok(ArgminError::ConditionViolated { text }) => ("condition violated", text),
            Ok(ArgminError::CheckpointNotFound { text }) => ("checkpoint not found", text),
            Ok(ArgminError::PotentialBug { text }) => ("potential bug", text),
            Ok(ArgminError::ImpossibleError { text }) => ("impossible", text),
            Ok(other) => ("argmin", other.to_string()),
            Err(other) => ("backend", other.to_string()),
        };
        OptError::Solver { kind, text }
    }
}
