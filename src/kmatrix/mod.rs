//! kmatrix — K-matrix resonance dynamics and the composite ηπ amplitude.
//!
//! Purpose
//! -------
//! Provide the physics layer of the crate: validated wave tables, the
//! per-wave unitarized K-matrix engine, and the four-wave amplitude whose
//! intensity enters the extended likelihood.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds numeric precision, channels, spins, and [`WaveConfig`].
//! - [`models`] holds [`ResonanceModel`], [`CompositeAmplitude`], and the
//!   fixed wave tables.
//! - [`errors`] separates fatal configuration errors ([`KMatrixError`]) from
//!   recoverable per-point inversion failures ([`InversionFailure`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Only J = 0 and J = 2 are supported; anything else fails at
//!   construction.
//! - Every evaluation is a pure function of `s` (and the couplings); nothing
//!   is cached across calls.
//! - This layer performs no I/O and no logging.
//!
//! Conventions
//! -----------
//! - Masses in GeV, `s` in GeV², angles in radians.
//! - Working precision is [`Float`] (`f64` unless the `f32` feature is on).
//!
//! Downstream usage
//! ----------------
//! - Typical flow:
//!   1. `CompositeAmplitude::standard()` (or `new` with custom tables).
//!   2. `precompute(s)` per event, keeping the [`EventContext`].
//!   3. `intensity_with(β, s, θ, φ, &ctx)` per coupling vector.
//! - The likelihood layer wraps this flow; most callers should start there.
//!
//! Testing notes
//! -------------
//! - Reference kinematics for the a2 channel set are pinned in
//!   `models::resonance`; configuration rejection paths in `core::config`;
//!   composite behavior in `models::amplitude`.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{AdlerZero, Channel, Complex, Float, Resonance, Spin, WaveConfig};

pub use self::errors::{
    InversionFailure, InversionFailureKind, InversionResult, KMatrixError, KMatrixResult,
};

pub use self::models::{CompositeAmplitude, EventContext, ResonanceModel, Wave, WaveContext};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::{
        AdlerZero, Channel, Complex, CompositeAmplitude, EventContext, Float, InversionFailure,
        InversionFailureKind, InversionResult, KMatrixError, KMatrixResult, Resonance,
        ResonanceModel, Spin, Wave, WaveConfig, WaveContext,
    };
}
