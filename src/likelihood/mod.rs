//! likelihood — event samples, coupling layouts, and the extended likelihood.
//!
//! Purpose
//! -------
//! Turn a [`CompositeAmplitude`](crate::kmatrix::CompositeAmplitude) plus
//! observed and simulated events into an objective that samplers and the
//! built-in maximizer can evaluate many times per second.
//!
//! Key behaviors
//! -------------
//! - [`data`]: validated column-wise samples, the [`EventSource`] loader and
//!   the count-only [`EventCount`] contracts.
//! - [`couplings`]: the flat parameter vector ↔ complex coupling mapping.
//! - [`setup`]: one-time per-event precomputation with survivor accounting.
//! - [`evaluator`]: the type-state evaluator, `ℓ`, `∇ℓ`, fitting, and
//!   standard errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - After setup, every kept event has exactly one context and indices stay
//!   aligned.
//! - Evaluation results are independent of thread count and event order up
//!   to floating-point reassociation.
//!
//! Downstream usage
//! ----------------
//! - Python bindings wrap [`ReadyLikelihood`] as `KMatrixLikelihood`.
//! - Rust callers build an [`UnconfiguredLikelihood`], call `setup()`, then
//!   evaluate or fit.

pub mod couplings;
pub mod data;
pub mod errors;
pub mod evaluator;
pub mod setup;

pub use self::couplings::{CouplingLayout, CouplingSlot};
pub use self::data::{EventCount, EventSample, EventSource, GeneratedCount};
pub use self::errors::{LikelihoodError, LikelihoodResult};
pub use self::evaluator::{
    DomainPolicy, ExtendedLikelihood, LikelihoodOptions, LikelihoodState, ReadyLikelihood,
    UnconfiguredLikelihood,
};
pub use self::setup::{EventFailure, PrecomputedSample, SetupReport};

// Downstream crates can write
//
//     use rust_kmatrix::likelihood::prelude::*;
//
// to import the likelihood surface in one line.
pub mod prelude {
    pub use super::couplings::CouplingLayout;
    pub use super::data::{EventCount, EventSample, EventSource, GeneratedCount};
    pub use super::errors::{LikelihoodError, LikelihoodResult};
    pub use super::evaluator::{
        DomainPolicy, LikelihoodOptions, ReadyLikelihood, UnconfiguredLikelihood,
    };
}
