//! Errors for event samples, coupling layouts, and likelihood evaluation.
//!
//! [`LikelihoodError`] is the single error surface of the `likelihood`
//! module. Wave-table problems arrive wrapped as [`LikelihoodError::KMatrix`];
//! per-event inversion failures never appear here because setup drops those
//! events and records them in its report instead.
//!
//! ## Conventions
//! - Event indices are 0-based positions in the sample being evaluated
//!   (after setup, positions among the surviving events).
//! - Numeric payloads are widened to `f64` for reporting.
use crate::kmatrix::errors::KMatrixError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for the likelihood layer.
pub type LikelihoodResult<T> = Result<T, LikelihoodError>;

#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodError {
    // ---- Samples ----
    /// Event columns must all have the same length.
    ColumnLengthMismatch { column: &'static str, expected: usize, found: usize },

    /// Event columns must be finite.
    NonFiniteValue { column: &'static str, index: usize, value: f64 },

    /// Invariant mass (squared) must be strictly positive.
    NonPositiveInvariant { index: usize, value: f64 },

    /// A sample that the objective depends on has no events.
    EmptySample { sample: &'static str },

    /// The generated-event count normalizing the MC sum must be positive.
    NoGeneratedEvents,

    // ---- Parameters ----
    /// Parameter vector does not match the coupling layout.
    ThetaLengthMismatch { expected: usize, found: usize },

    /// Parameters must be finite.
    NonFiniteParameter { index: usize, value: f64 },

    /// A fixed coupling magnitude must be finite and positive.
    InvalidFixedMagnitude { value: f64 },

    // ---- Domain ----
    /// A data event has zero or negative intensity under these couplings.
    NonPositiveIntensity { index: usize, value: f64 },

    /// An intensity evaluated to NaN or ±∞.
    NonFiniteIntensity { sample: &'static str, index: usize, value: f64 },

    // ---- Wrapped ----
    /// Wave configuration or evaluation error.
    KMatrix(KMatrixError),
}

impl std::error::Error for LikelihoodError {}

impl std::fmt::Display for LikelihoodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Samples ----
            LikelihoodError::ColumnLengthMismatch { column, expected, found } => {
                write!(f, "Column '{column}' has {found} entries, expected {expected}")
            }
            LikelihoodError::NonFiniteValue { column, index, value } => {
                write!(f, "Non-finite value in column '{column}' at index {index}: {value}")
            }
            LikelihoodError::NonPositiveInvariant { index, value } => {
                write!(f, "Invariant mass at index {index} is {value}, must be > 0")
            }
            LikelihoodError::EmptySample { sample } => {
                write!(f, "The {sample} sample has no events")
            }
            LikelihoodError::NoGeneratedEvents => {
                write!(f, "Number of generated events must be greater than zero")
            }

            // ---- Parameters ----
            LikelihoodError::ThetaLengthMismatch { expected, found } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, found {found}")
            }
            LikelihoodError::NonFiniteParameter { index, value } => {
                write!(f, "Parameter {index} is {value}, must be finite")
            }
            LikelihoodError::InvalidFixedMagnitude { value } => {
                write!(f, "Fixed coupling magnitude {value} must be finite and positive")
            }

            // ---- Domain ----
            LikelihoodError::NonPositiveIntensity { index, value } => {
                write!(f, "Data event {index} has non-positive intensity {value}")
            }
            LikelihoodError::NonFiniteIntensity { sample, index, value } => {
                write!(f, "Non-finite intensity {value} for {sample} event {index}")
            }

            // ---- Wrapped ----
            LikelihoodError::KMatrix(err) => write!(f, "K-matrix error: {err}"),
        }
    }
}

impl From<KMatrixError> for LikelihoodError {
    fn from(err: KMatrixError) -> Self {
        LikelihoodError::KMatrix(err)
    }
}

/// Convert a [`LikelihoodError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl From<LikelihoodError> for PyErr {
    fn from(err: LikelihoodError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
