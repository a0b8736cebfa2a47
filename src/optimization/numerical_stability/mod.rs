//! numerical_stability — reproducible reductions and shared numeric floors.
//!
//! Purpose
//! -------
//! Keep the numerically sensitive plumbing of the likelihood in one place:
//! order-independent summation of many small per-event terms and the
//! eigenvalue floor used when pseudo-inverting the observed information.
//!
//! Key behaviors
//! -------------
//! - [`summation`] provides pairwise and chunked parallel sums whose result
//!   depends only on the input length, not on rayon scheduling.
//!
//! Invariants & assumptions
//! ------------------------
//! - All reductions are over `f64`; per-event terms computed at working
//!   precision are widened before they are summed.
//!
//! Downstream usage
//! ----------------
//! - `likelihood::evaluator` for value and gradient sums.
//! - `inference::hessian` for [`EIGEN_EPS`].

pub mod summation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::summation::{
    EIGEN_EPS, REDUCTION_CHUNK, chunked_parallel_sum, pairwise_sum, pairwise_sum_vec,
    try_chunked_sum, try_chunked_sum_vec,
};

pub mod prelude {
    pub use super::summation::{EIGEN_EPS, REDUCTION_CHUNK, chunked_parallel_sum, pairwise_sum};
}
