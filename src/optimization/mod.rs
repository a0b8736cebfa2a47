//! optimization — maximizer, deterministic reductions, and error surface.
//!
//! Purpose
//! -------
//! Everything the likelihood layer needs to turn per-event intensities into
//! a fitted coupling vector: an argmin-backed maximizer
//! (`loglik_optimizer`), order-stable parallel summation
//! (`numerical_stability`), and one error enum (`errors::OptError`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = −ℓ(θ)`; user-facing
//!   values are always `ℓ`.
//! - Reductions in `numerical_stability` give bitwise-identical results for
//!   any rayon thread count.
//!
//! Conventions
//! -----------
//! - Fallible entry points return `OptResult<T>`; raw argmin errors and
//!   `LikelihoodError` values are converted at the boundary.
//! - No logging happens here apart from the optional argmin slog observer
//!   (`obs_slog` feature).
//!
//! Downstream usage
//! ----------------
//! - `likelihood::evaluator` implements `LogLikelihood` for the extended
//!   likelihood and sums with `try_chunked_sum`.
//! - `inference::hessian` uses `finite_diff::compute_hessian` and
//!   `EIGEN_EPS`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// Downstream crates can write
//
//     use rust_kmatrix::optimization::prelude::*;
//
// to import the optimization surface in one line.
pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
