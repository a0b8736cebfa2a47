//! models — K-matrix dynamics per wave and the four-wave composite amplitude.
//!
//! Purpose
//! -------
//! Turn validated wave configurations into evaluable amplitudes. This layer
//! sits on top of `kmatrix::core` and below the likelihood evaluator.
//!
//! Key behaviors
//! -------------
//! - [`resonance`] implements one unitarized K-matrix wave
//!   ([`ResonanceModel`]): kinematics, barrier ratios, `K`, `C`,
//!   `(I + KC)⁻¹`, and the production amplitude in two call shapes.
//! - [`amplitude`] combines the f0, f2, a0, and a2 waves with angular factors
//!   ([`CompositeAmplitude`]) and defines the per-event precomputed
//!   [`EventContext`].
//! - [`tables`] holds the fixed pole/coupling/background tables.
//!
//! Invariants & assumptions
//! ------------------------
//! - All types here are immutable after construction and `Send + Sync`;
//!   they are shared read-only across rayon workers.
//!
//! Downstream usage
//! ----------------
//! - `likelihood::setup` calls [`CompositeAmplitude::precompute`] once per
//!   event; `likelihood::evaluator` calls
//!   [`CompositeAmplitude::intensity_with`] per parameter vector.

pub mod amplitude;
pub mod resonance;
pub mod tables;

pub use self::amplitude::{CompositeAmplitude, EventContext, Wave, WaveContext};
pub use self::resonance::ResonanceModel;
