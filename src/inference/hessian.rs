//! Classical covariance and standard errors from the observed information.
//!
//! The observed information is the finite-difference Jacobian of the cost
//! gradient `−∇ℓ` at `θ̂`, taken through the same [`ArgMinAdapter`] the
//! optimizer uses (so objectives without an analytic gradient still work).
//! It is inverted with a symmetric eigendecomposition, discarding
//! eigenvalues `≤ EIGEN_EPS`; directions the data do not constrain (for
//! example the phase of a vanishing coupling) therefore get zero variance
//! instead of poisoning the whole matrix.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, LogLikelihood, Theta, adapter::ArgMinAdapter, finite_diff::compute_hessian,
    },
    numerical_stability::EIGEN_EPS,
};
use argmin::core::{Error, Gradient};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use std::cell::RefCell;

/// Pseudo-inverse of the observed information at `theta_hat`.
///
/// Errors
/// ------
/// - The first error raised by the objective's gradient while
///   differencing.
/// - `OptError::InvalidHessian` / `HessianDimMismatch` if the
///   finite-difference Hessian is unusable.
pub fn calc_covariance<F: LogLikelihood>(
    f: &F, data: &F::Data, theta_hat: &Theta,
) -> OptResult<Array2<f64>> {
    let obs_info = observed_information(f, data, theta_hat)?;
    Ok(pseudo_inverse(&to_dmatrix(&obs_info)))
}

/// Square roots of the diagonal of [`calc_covariance`].
pub fn calc_standard_errors<F: LogLikelihood>(
    f: &F, data: &F::Data, theta_hat: &Theta,
) -> OptResult<Array1<f64>> {
    let obs_info = observed_information(f, data, theta_hat)?;
    Ok(solve_for_se(to_dmatrix(&obs_info)))
}

fn observed_information<F: LogLikelihood>(
    f: &F, data: &F::Data, theta_hat: &Theta,
) -> OptResult<Array2<f64>> {
    let adapter = ArgMinAdapter::new(f, data);
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost_grad = |theta: &Theta| -> Grad {
        adapter.gradient(theta).unwrap_or_else(|e| {
            let mut slot = closure_err.borrow_mut();
            if slot.is_none() {
                *slot = Some(e);
            }
            Array1::from_elem(theta.len(), f64::NAN)
        })
    };
    let hessian = compute_hessian(&cost_grad, theta_hat);
    if let Some(err) = closure_err.take() {
        return Err(OptError::from(err));
    }
    hessian
}

fn to_dmatrix(m: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

fn pseudo_inverse(obs_info: &DMatrix<f64>) -> Array2<f64> {
    let n = obs_info.nrows();
    let eigen = obs_info.clone().symmetric_eigen();
    let q = &eigen.eigenvectors;
    let mut cov = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            for j in 0..n {
                cov[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
            }
        }
    }
    cov
}

fn solve_for_se(obs_info: DMatrix<f64>) -> Array1<f64> {
    let n = obs_info.nrows();
    let eigen = obs_info.symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut se = Array1::<f64>::zeros(n);
    for i in 0..n {
        let var: f64 = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > EIGEN_EPS)
            .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
            .sum();
        se[i] = var.sqrt();
    }
    se
}
