//! Deterministic parallel reductions for per-event sums.
//!
//! Purpose
//! -------
//! Sum per-event contributions (log-intensities, normalization terms,
//! gradient vectors) across rayon workers so that the result is bitwise
//! reproducible regardless of the thread count.
//!
//! Key behaviors
//! -------------
//! - Indices `0..len` are split into fixed chunks of [`REDUCTION_CHUNK`].
//!   Each chunk is evaluated sequentially and reduced with [`pairwise_sum`];
//!   the per-chunk partials are collected in chunk order and pairwise-summed
//!   again.
//! - Fallible variants stop a chunk at its first error and return the error
//!   with the smallest event index overall.
//!
//! Invariants & assumptions
//! ------------------------
//! - The chunk size is a compile-time constant; the reduction tree depends
//!   only on `len`, never on scheduling.
//! - Vector variants require every contribution to have length `dim`.
//!
//! Downstream usage
//! ----------------
//! - `likelihood::evaluator` reduces data and MC sums through
//!   [`try_chunked_sum`] / [`try_chunked_sum_vec`].
//! - `inference::hessian` uses [`EIGEN_EPS`] as its eigenvalue floor.
use ndarray::Array1;
use rayon::prelude::*;
use std::convert::Infallible;

/// Number of events reduced sequentially per rayon task.
pub const REDUCTION_CHUNK: usize = 1024;

/// Eigenvalues at or below this are treated as zero in pseudo-inverses.
pub const EIGEN_EPS: f64 = 1e-10;

/// Below this length pairwise summation falls back to a plain loop.
const PAIRWISE_BASE: usize = 8;

/// Pairwise (cascade) summation; error grows as `O(log n)` instead of `O(n)`.
pub fn pairwise_sum(values: &[f64]) -> f64 {
    if values.len() <= PAIRWISE_BASE {
        return values.iter().sum();
    }
    let (lhs, rhs) = values.split_at(values.len() / 2);
    pairwise_sum(lhs) + pairwise_sum(rhs)
}

/// Component-wise pairwise summation of equally sized vectors.
pub fn pairwise_sum_vec(values: &[Array1<f64>], dim: usize) -> Array1<f64> {
    match values.len() {
        0 => Array1::zeros(dim),
        1 => values[0].clone(),
        n => {
            let (lhs, rhs) = values.split_at(n / 2);
            pairwise_sum_vec(lhs, dim) + pairwise_sum_vec(rhs, dim)
        }
    }
}

/// Deterministic parallel sum of `f(0) + … + f(len − 1)`.
pub fn chunked_parallel_sum<F>(len: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync,
{
    match try_chunked_sum(len, |i| Ok::<f64, Infallible>(f(i))) {
        Ok(total) => total,
        Err(never) => match never {},
    }
}

/// Fallible deterministic parallel sum.
///
/// Errors
/// ------
/// - The error of the lowest failing index; later chunks may still run but
///   their results are discarded.
pub fn try_chunked_sum<E, F>(len: usize, f: F) -> Result<f64, E>
where
    E: Send,
    F: Fn(usize) -> Result<f64, E> + Sync,
{
    let partials: Vec<Result<f64, E>> = chunk_starts(len)
        .into_par_iter()
        .map(|start| {
            let end = (start + REDUCTION_CHUNK).min(len);
            let terms = (start..end).map(&f).collect::<Result<Vec<f64>, E>>()?;
            Ok(pairwise_sum(&terms))
        })
        .collect();
    let partials = partials.into_iter().collect::<Result<Vec<f64>, E>>()?;
    Ok(pairwise_sum(&partials))
}

/// Fallible deterministic parallel sum of length-`dim` vectors.
pub fn try_chunked_sum_vec<E, F>(len: usize, dim: usize, f: F) -> Result<Array1<f64>, E>
where
    E: Send,
    F: Fn(usize) -> Result<Array1<f64>, E> + Sync,
{
    let partials: Vec<Result<Array1<f64>, E>> = chunk_starts(len)
        .into_par_iter()
        .map(|start| {
            let end = (start + REDUCTION_CHUNK).min(len);
            let terms = (start..end).map(&f).collect::<Result<Vec<Array1<f64>>, E>>()?;
            Ok(pairwise_sum_vec(&terms, dim))
        })
        .collect();
    let partials = partials.into_iter().collect::<Result<Vec<Array1<f64>>, E>>()?;
    Ok(pairwise_sum_vec(&partials, dim))
}

fn chunk_starts(len: usize) -> Vec<usize> {
    (0..len).step_by(REDUCTION_CHUNK).collect()
}
