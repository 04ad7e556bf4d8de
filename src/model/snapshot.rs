//! model::snapshot — parameter snapshots and scoped restoration.
//!
//! Purpose
//! -------
//! Capture the complete mutable state of a [`ParameterSet`] (values and
//! constant flags) and guarantee it is put back when a scan component exits,
//! whichever way it exits.
//!
//! Key behaviors
//! -------------
//! - [`ParameterSnapshot`] is an immutable copy; restoring it reproduces the
//!   exact bit pattern of every value, so repeated evaluations at the same
//!   point are identical.
//! - [`ParameterGuard`] takes a snapshot on construction, dereferences to the
//!   guarded holder, and restores the snapshot in `Drop`.
//!
//! Conventions
//! -----------
//! - Anything that owns a [`ParameterSet`] implements [`HoldsParameters`] and
//!   can be guarded: the evaluator and the scan context both do.
use std::ops::{Deref, DerefMut};

use crate::model::params::{Parameter, ParameterSet};

/// Immutable copy of parameter values and constant flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    values: Vec<f64>,
    constant: Vec<bool>,
}

impl ParameterSnapshot {
    pub(crate) fn capture(params: &[Parameter]) -> Self {
        Self {
            values: params.iter().map(|p| p.value).collect(),
            constant: params.iter().map(|p| p.constant).collect(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn constant_flags(&self) -> &[bool] {
        &self.constant
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

/// Access to a mutable parameter set.
pub trait HoldsParameters {
    fn parameter_set(&self) -> &ParameterSet;
    fn parameter_set_mut(&mut self) -> &mut ParameterSet;
}

/// Scoped acquisition of a parameter holder.
///
/// The snapshot is taken in [`ParameterGuard::new`] and restored (values and
/// constant flags) when the guard is dropped, including on early returns and
/// `?` propagation in the guarded scope.
pub struct ParameterGuard<'g, H: HoldsParameters + ?Sized> {
    holder: &'g mut H,
    saved: ParameterSnapshot,
}

impl<'g, H: HoldsParameters + ?Sized> ParameterGuard<'g, H> {
    pub fn new(holder: &'g mut H) -> Self {
        let saved = holder.parameter_set().snapshot();
        Self { holder, saved }
    }

    /// The state that will be restored on drop.
    pub fn saved(&self) -> &ParameterSnapshot {
        &self.saved
    }
}

impl<H: HoldsParameters + ?Sized> Deref for ParameterGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.holder
    }
}

impl<H: HoldsParameters + ?Sized> DerefMut for ParameterGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.holder
    }
}

impl<H: HoldsParameters + ?Sized> Drop for ParameterGuard<'_, H> {
    fn drop(&mut self) {
        self.holder.parameter_set_mut().restore(&self.saved);
    }
}

impl HoldsParameters for ParameterSet {
    fn parameter_set(&self) -> &ParameterSet {
        self
    }

    fn parameter_set_mut(&mut self) -> &mut ParameterSet {
        self
    }
}
