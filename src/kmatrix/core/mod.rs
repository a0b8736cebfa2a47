//! kmatrix::core — building blocks for K-matrix waves.
//!
//! Purpose
//! -------
//! Collect the configuration-level pieces of a partial wave: numeric
//! precision, two-body channels and their kinematics, spin-dependent
//! barrier factors, and the validated [`WaveConfig`] that ties them
//! together.
//!
//! Key behaviors
//! -------------
//! - [`numeric`] fixes the working precision (`Float`) and the branch-cut
//!   helper used by every square root and logarithm.
//! - [`channel`] evaluates `χ±`, `ρ`, `q`, and the Chew–Mandelstam entry
//!   for one channel.
//! - [`spin`] maps `J` onto the closed [`Spin`] enum and evaluates the
//!   Blatt–Weisskopf factor.
//! - [`config`] validates complete wave tables.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything in this module is immutable once constructed and free of
//!   interior mutability, so waves can be shared across threads.
//!
//! Downstream usage
//! ----------------
//! - `kmatrix::models` assembles per-channel quantities into matrices and
//!   implements the unitarized amplitude on top of these types.

pub mod channel;
pub mod config;
pub mod numeric;
pub mod spin;

pub use self::channel::Channel;
pub use self::config::{AdlerZero, Resonance, WaveConfig};
pub use self::numeric::{Complex, Float};
pub use self::spin::{BARRIER_SCALE, Spin};
