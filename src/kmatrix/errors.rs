//! Errors for K-matrix wave configuration and per-point matrix inversion.
//!
//! This module defines the configuration error type, [`KMatrixError`], and the
//! recoverable numerical failure, [`InversionFailure`], used by the resonance
//! model and the composite amplitude. Both implement `Display`/`Error` and
//! convert to `PyErr` when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based**; channel indices follow the order in which
//!   channels were supplied to [`WaveConfig`](crate::kmatrix::core::config::WaveConfig),
//!   resonance indices follow the order of the resonance list.
//! - [`KMatrixError`] is always fatal: it is raised before any dynamics are
//!   evaluated and signals a malformed wave table.
//! - [`InversionFailure`] is local to one kinematic point. Callers decide
//!   whether to drop the point (the likelihood setup pass does) or to abort.
use crate::kmatrix::core::numeric::Float;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for wave construction and configuration-dependent calls.
pub type KMatrixResult<T> = Result<T, KMatrixError>;

/// Result alias for `(I + K C)⁻¹` evaluations at a single `s`.
pub type InversionResult<T> = Result<T, InversionFailure>;

/// Fatal configuration errors for a K-matrix wave.
#[derive(Debug, Clone, PartialEq)]
pub enum KMatrixError {
    // ---- Spin ----
    /// Only J = 0 and J = 2 barrier factors are defined.
    UnsupportedSpin { spin: u32 },

    // ---- Shapes ----
    /// A wave needs at least one channel and one resonance.
    EmptyWave { channels: usize, resonances: usize },

    /// A resonance carries the wrong number of channel couplings.
    CouplingCountMismatch { resonance: usize, expected: usize, found: usize },

    /// Background matrix must be `C × C`.
    BackgroundDimMismatch { expected: usize, found: (usize, usize) },

    /// Background matrix must be symmetric.
    AsymmetricBackground { row: usize, col: usize },

    /// Output channel must index into the channel list.
    OutputChannelOutOfRange { index: usize, channels: usize },

    /// A wave's spin does not match the angular factor of its slot.
    WaveSpinMismatch { wave: &'static str, expected: u32, found: u32 },

    // ---- Values ----
    /// Daughter masses must be finite and strictly positive.
    InvalidChannelMass { channel: usize, value: Float },

    /// Resonance masses must be finite and strictly positive.
    InvalidResonanceMass { resonance: usize, value: Float },

    /// Couplings and background entries must be finite.
    NonFiniteEntry { what: &'static str, row: usize, col: usize, value: Float },

    /// Adler-zero normalization must be finite and non-zero.
    InvalidAdlerZero { s0: Float, s_norm: Float },

    /// Barrier factor at a pole mass is zero or non-finite, so `B(s)` is undefined.
    DegenerateBarrier { channel: usize, resonance: usize, value: Float },

    // ---- Evaluation ----
    /// Production couplings must have one entry per resonance.
    CouplingLengthMismatch { expected: usize, found: usize },

    /// Barrier matrix must be `C × A`.
    BarrierDimMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Inverse row must have one entry per channel.
    RowLengthMismatch { expected: usize, found: usize },
}

impl std::error::Error for KMatrixError {}

impl std::fmt::Display for KMatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Spin ----
            KMatrixError::UnsupportedSpin { spin } => {
                write!(f, "Unsupported spin J = {spin}: only J = 0 and J = 2 are defined")
            }

            // ---- Shapes ----
            KMatrixError::EmptyWave { channels, resonances } => {
                write!(
                    f,
                    "Wave must have at least one channel and one resonance: found {channels} channels, {resonances} resonances"
                )
            }
            KMatrixError::CouplingCountMismatch { resonance, expected, found } => {
                write!(
                    f,
                    "Resonance {resonance} has {found} channel couplings, expected {expected}"
                )
            }
            KMatrixError::BackgroundDimMismatch { expected, found } => {
                write!(
                    f,
                    "Background dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            KMatrixError::AsymmetricBackground { row, col } => {
                write!(f, "Background matrix is not symmetric at ({row}, {col})")
            }
            KMatrixError::OutputChannelOutOfRange { index, channels } => {
                write!(f, "Output channel {index} out of range for {channels} channels")
            }
            KMatrixError::WaveSpinMismatch { wave, expected, found } => {
                write!(f, "Wave {wave} must have J = {expected}, found J = {found}")
            }

            // ---- Values ----
            KMatrixError::InvalidChannelMass { channel, value } => {
                write!(f, "Invalid daughter mass in channel {channel}: {value}, must be finite and > 0")
            }
            KMatrixError::InvalidResonanceMass { resonance, value } => {
                write!(f, "Invalid mass for resonance {resonance}: {value}, must be finite and > 0")
            }
            KMatrixError::NonFiniteEntry { what, row, col, value } => {
                write!(f, "Non-finite {what} entry at ({row}, {col}): {value}")
            }
            KMatrixError::InvalidAdlerZero { s0, s_norm } => {
                write!(f, "Invalid Adler zero (s0 = {s0}, s_norm = {s_norm}): s_norm must be finite and non-zero")
            }
            KMatrixError::DegenerateBarrier { channel, resonance, value } => {
                write!(
                    f,
                    "Barrier factor for channel {channel} at the mass of resonance {resonance} is {value}; cannot normalize"
                )
            }

            // ---- Evaluation ----
            KMatrixError::CouplingLengthMismatch { expected, found } => {
                write!(f, "Coupling vector length mismatch: expected {expected}, found {found}")
            }
            KMatrixError::BarrierDimMismatch { expected, found } => {
                write!(f, "Barrier matrix dimension mismatch: expected {expected:?}, found {found:?}")
            }
            KMatrixError::RowLengthMismatch { expected, found } => {
                write!(f, "Inverse row length mismatch: expected {expected}, found {found}")
            }
        }
    }
}

/// Why `I + K(s) C(s)` could not be inverted at a given `s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InversionFailureKind {
    /// LU decomposition found an exactly singular pivot.
    Singular,
    /// The inverse exists but its reciprocal condition number is below the
    /// working precision.
    IllConditioned { rcond: Float },
    /// The matrix or its inverse contains NaN or ±∞ entries.
    NonFinite,
}

/// Recoverable failure of `(I + K C)⁻¹` at a single kinematic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionFailure {
    /// Kinematic invariant at which the inversion failed (GeV²).
    pub s: Float,
    /// Failure classification.
    pub kind: InversionFailureKind,
}

impl InversionFailure {
    pub fn new(s: Float, kind: InversionFailureKind) -> Self {
        Self { s, kind }
    }
}

impl std::error::Error for InversionFailure {}

impl std::fmt::Display for InversionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            InversionFailureKind::Singular => {
                write!(f, "I + KC is singular at s = {}", self.s)
            }
            InversionFailureKind::IllConditioned { rcond } => {
                write!(f, "I + KC is ill-conditioned at s = {} (rcond = {rcond:e})", self.s)
            }
            InversionFailureKind::NonFinite => {
                write!(f, "I + KC or its inverse is non-finite at s = {}", self.s)
            }
        }
    }
}

/// Convert a [`KMatrixError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl From<KMatrixError> for PyErr {
    fn from(err: KMatrixError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
