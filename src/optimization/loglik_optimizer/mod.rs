//! loglik_optimizer — argmin-backed maximization of log-likelihoods.
//!
//! Purpose
//! -------
//! Fit the coupling parameters of the extended likelihood (or any other
//! objective implementing [`LogLikelihood`]) with L-BFGS, without callers
//! touching argmin directly.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the argmin cost
//!   `c(θ) = −ℓ(θ)`, with finite-difference gradients as a fallback.
//! - [`maximize`] validates the start, builds the solver selected by
//!   [`traits::LineSearcher`] via [`builders`], runs it via
//!   [`run::run_lbfgs`], and returns a validated [`OptimOutcome`].
//! - [`finite_diff`] provides error-capturing numerical gradients and the
//!   Hessian used for standard errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives report domain failures as `OptError` values, never panics.
//! - [`Tolerances`] and [`MLEOptions`] are validated on construction.
//!
//! Conventions
//! -----------
//! - [`LogLikelihood::grad`] returns `∇ℓ`; the adapter flips the sign.
//! - [`OptimOutcome::value`] is `ℓ(θ̂)`, never the cost.
//!
//! Testing notes
//! -------------
//! - Submodule tests use small analytic objectives (quadratic bowls);
//!   fitting the resonance couplings is exercised in `likelihood` and the
//!   integration tests.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// Downstream crates can write
//
//     use rust_kmatrix::optimization::loglik_optimizer::prelude::*;
//
// to import the optimizer surface in one line.
pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
