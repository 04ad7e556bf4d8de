//! model::params — named, bounded model parameters.
//!
//! Purpose
//! -------
//! Hold the mutable parameter vector that every scan component reads and
//! writes: names, current values, box bounds, constant flags, and the role a
//! parameter plays in the model (parameter of interest or nuisance).
//!
//! Key behaviors
//! -------------
//! - Validate parameters on construction ([`Parameter::new`]) and reject
//!   duplicate names when assembling a [`ParameterSet`].
//! - Clamp every value written through [`ParameterSet::set_value`] into the
//!   parameter's bounds, so probes stepping outside the box land on its edge.
//! - Expose the non-constant subset ([`ParameterSet::free_indices`]) that
//!   local minimizers optimize over.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower < upper`, both finite; `lower <= value <= upper` at all times.
//! - The set never grows or shrinks after construction, so indices handed
//!   out by [`ParameterSet::index_of`] stay valid for the lifetime of a scan.
//!
//! Conventions
//! -----------
//! - Parameter order is the order of the `Theta` vector passed to
//!   [`NegLogLikelihood`](crate::model::NegLogLikelihood) implementations.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::model::{
    errors::{ModelError, ModelResult},
    snapshot::ParameterSnapshot,
};
use crate::optimization::profile_minimizer::Theta;

/// Role of a parameter inside the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterRole {
    /// Declared parameter of interest; may be scanned or held as an "other" POI.
    Interest,
    /// Nuisance parameter; profiled whenever it is not constant.
    Nuisance,
}

/// A single named, bounded parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    pub constant: bool,
    pub role: ParameterRole,
}

impl Parameter {
    /// Construct a validated, floating parameter.
    ///
    /// Errors
    /// ------
    /// - [`ModelError::EmptyName`] for an empty name.
    /// - [`ModelError::InvalidBounds`] when a bound is non-finite or
    ///   `lower >= upper`.
    /// - [`ModelError::ValueOutOfBounds`] when `value` is non-finite or lies
    ///   outside `[lower, upper]`.
    pub fn new(
        name: impl Into<String>, value: f64, lower: f64, upper: f64, role: ParameterRole,
    ) -> ModelResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        if !lower.is_finite() || !upper.is_finite() {
            return Err(ModelError::InvalidBounds {
                name,
                lower,
                upper,
                reason: "Bounds must be finite.",
            });
        }
        if lower >= upper {
            return Err(ModelError::InvalidBounds {
                name,
                lower,
                upper,
                reason: "Lower bound must be strictly below the upper bound.",
            });
        }
        if !value.is_finite() || value < lower || value > upper {
            return Err(ModelError::ValueOutOfBounds { name, value, lower, upper });
        }
        Ok(Self { name, value, lower, upper, constant: false, role })
    }

    /// Shorthand for a parameter of interest.
    pub fn interest(name: impl Into<String>, value: f64, lower: f64, upper: f64) -> ModelResult<Self> {
        Self::new(name, value, lower, upper, ParameterRole::Interest)
    }

    /// Shorthand for a nuisance parameter.
    pub fn nuisance(name: impl Into<String>, value: f64, lower: f64, upper: f64) -> ModelResult<Self> {
        Self::new(name, value, lower, upper, ParameterRole::Nuisance)
    }

    /// Return the same parameter with its constant flag set.
    pub fn fixed(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.lower, self.upper)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_interest(&self) -> bool {
        self.role == ParameterRole::Interest
    }
}

/// Ordered collection of uniquely named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    /// Assemble a set, rejecting empty input and duplicate names.
    pub fn new(params: Vec<Parameter>) -> ModelResult<Self> {
        if params.is_empty() {
            return Err(ModelError::EmptyParameterSet);
        }
        for (i, p) in params.iter().enumerate() {
            if params[..i].iter().any(|q| q.name == p.name) {
                return Err(ModelError::DuplicateParameter { name: p.name.clone() });
            }
        }
        Ok(Self { params })
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Current values as a `Theta` vector in set order.
    pub fn values(&self) -> Theta {
        Array1::from_iter(self.params.iter().map(|p| p.value))
    }

    /// Write `value` into parameter `index`, clamped to its bounds.
    ///
    /// Out-of-range indices are ignored; indices come from
    /// [`ParameterSet::index_of`] on the same set.
    pub fn set_value(&mut self, index: usize, value: f64) {
        if let Some(p) = self.params.get_mut(index) {
            p.value = p.clamp(value);
        }
    }

    pub fn set_constant(&mut self, index: usize, constant: bool) {
        if let Some(p) = self.params.get_mut(index) {
            p.constant = constant;
        }
    }

    /// Indices of the non-constant parameters, in set order.
    pub fn free_indices(&self) -> Vec<usize> {
        self.params.iter().enumerate().filter(|(_, p)| !p.constant).map(|(i, _)| i).collect()
    }

    /// Indices of all parameters with the given role, in set order.
    pub fn indices_with_role(&self, role: ParameterRole) -> Vec<usize> {
        self.params.iter().enumerate().filter(|(_, p)| p.role == role).map(|(i, _)| i).collect()
    }

    /// Copy values and constant flags.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot::capture(&self.params)
    }

    /// Restore values only; constant flags are left as they are.
    pub fn restore_values(&mut self, snapshot: &ParameterSnapshot) {
        for (p, &v) in self.params.iter_mut().zip(snapshot.values()) {
            p.value = v;
        }
    }

    /// Restore values and constant flags.
    pub fn restore(&mut self, snapshot: &ParameterSnapshot) {
        self.restore_values(snapshot);
        for (p, &c) in self.params.iter_mut().zip(snapshot.constant_flags()) {
            p.constant = c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Construction-time validation of `Parameter` and `ParameterSet`, clamping
    // of written values, and the free-subset view used by minimizers.
    // Snapshot semantics are covered in `model::snapshot`.
    // -------------------------------------------------------------------------

    fn demo_set() -> ParameterSet {
        ParameterSet::new(vec![
            Parameter::interest("r", 1.0, 0.0, 4.0).unwrap(),
            Parameter::nuisance("theta", 0.0, -3.0, 3.0).unwrap().fixed(),
            Parameter::nuisance("lumi", 0.1, -5.0, 5.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Reject bounds that are inverted, degenerate, or non-finite.
    //
    // Given
    // -----
    // - Three invalid `(lower, upper)` pairs.
    //
    // Expect
    // ------
    // - `ModelError::InvalidBounds` for each.
    fn parameter_new_rejects_invalid_bounds() {
        // Arrange
        let cases = [(1.0, 0.0), (2.0, 2.0), (f64::NEG_INFINITY, 1.0)];

        for (lower, upper) in cases {
            // Act
            let err = Parameter::interest("x", 0.5, lower, upper).unwrap_err();

            // Assert
            assert!(
                matches!(err, ModelError::InvalidBounds { .. }),
                "expected InvalidBounds for [{lower}, {upper}], got {err:?}"
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Values outside the box are rejected at construction.
    //
    // Given
    // -----
    // - Bounds `[0, 1]` and value `1.5`.
    //
    // Expect
    // ------
    // - `ModelError::ValueOutOfBounds`.
    fn parameter_new_rejects_value_outside_bounds() {
        // Act
        let err = Parameter::nuisance("x", 1.5, 0.0, 1.0).unwrap_err();

        // Assert
        assert_eq!(
            err,
            ModelError::ValueOutOfBounds { name: "x".into(), value: 1.5, lower: 0.0, upper: 1.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Duplicate names make point columns ambiguous and must be rejected.
    //
    // Given
    // -----
    // - Two parameters both named `r`.
    //
    // Expect
    // ------
    // - `ModelError::DuplicateParameter { name: "r" }`.
    fn parameter_set_rejects_duplicate_names() {
        // Arrange
        let params = vec![
            Parameter::interest("r", 1.0, 0.0, 2.0).unwrap(),
            Parameter::nuisance("r", 0.0, -1.0, 1.0).unwrap(),
        ];

        // Act
        let err = ParameterSet::new(params).unwrap_err();

        // Assert
        assert_eq!(err, ModelError::DuplicateParameter { name: "r".into() });
    }

    #[test]
    // Purpose
    // -------
    // Values written past a bound land exactly on that bound.
    //
    // Given
    // -----
    // - `r` with bounds `[0, 4]`.
    //
    // Expect
    // ------
    // - Writing `7.0` stores `4.0`; writing `-1.0` stores `0.0`.
    fn set_value_clamps_to_bounds() {
        // Arrange
        let mut set = demo_set();

        // Act / Assert
        set.set_value(0, 7.0);
        assert_eq!(set.get(0).unwrap().value, 4.0);
        set.set_value(0, -1.0);
        assert_eq!(set.get(0).unwrap().value, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // The free subset excludes constant parameters and tracks flag changes.
    //
    // Given
    // -----
    // - `theta` constant, `r` and `lumi` floating.
    //
    // Expect
    // ------
    // - Free indices `[0, 2]`, then `[2]` after fixing `r`.
    fn free_indices_follow_constant_flags() {
        // Arrange
        let mut set = demo_set();

        // Act / Assert
        assert_eq!(set.free_indices(), vec![0, 2]);
        set.set_constant(0, true);
        assert_eq!(set.free_indices(), vec![2]);
        assert_eq!(set.indices_with_role(ParameterRole::Nuisance), vec![1, 2]);
    }
}
