use thiserror::Error;

/// Result alias for parameter-model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    // ---- Parameter construction ----
    /// Parameter names identify columns in committed points and must be non-empty.
    #[error("Parameter names must be non-empty")]
    EmptyName,

    /// Bounds must be finite with `lower < upper`.
    #[error("Invalid bounds for parameter '{name}' [{lower}, {upper}]: {reason}")]
    InvalidBounds { name: String, lower: f64, upper: f64, reason: &'static str },

    /// Initial value must be finite and lie inside the bounds.
    #[error("Value {value} of parameter '{name}' lies outside [{lower}, {upper}]")]
    ValueOutOfBounds { name: String, value: f64, lower: f64, upper: f64 },

    // ---- Parameter set ----
    /// A parameter set needs at least one parameter.
    #[error("Parameter set is empty")]
    EmptyParameterSet,

    /// Names are unique within a set.
    #[error("Duplicate parameter name '{name}'")]
    DuplicateParameter { name: String },

    /// Theta handed to the model does not match the parameter set.
    #[error("Parameter vector length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}
