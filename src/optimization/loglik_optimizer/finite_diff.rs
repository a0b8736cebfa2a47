//! loglik_optimizer::finite_diff — numerical derivatives with error capture.
//!
//! Purpose
//! -------
//! Wrap `finitediff` so that objectives which can fail (e.g. a coupling
//! vector that drives a data intensity to zero) still produce either a
//! validated derivative or a real error, never a silent NaN.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient; an error captured by the
//!   evaluation closure wins over the numeric result.
//! - [`compute_hessian`]: central-difference Jacobian of a gradient map,
//!   falling back to forward differences when the central result fails
//!   validation, then symmetrized.
//!
//! Invariants & assumptions
//! ------------------------
//! - Closures passed to [`run_fd_diff`] store their first error in the
//!   shared cell and return `NaN`.
//! - Returned derivatives always pass [`validate_grad`] / [`validate_hessian`].
//!
//! Downstream usage
//! ----------------
//! - `adapter::ArgMinAdapter` uses [`run_fd_diff`] when no analytic gradient
//!   is available or the central-difference one is unusable.
//! - `inference::hessian` uses [`compute_hessian`] on `−∇ℓ` to build the
//!   observed information.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// Errors
/// ------
/// - The error captured in `closure_err` during differencing, converted to
///   `OptError`.
/// - `OptError::GradientDimMismatch` / `InvalidGradient` from validation.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Finite-difference Jacobian of the gradient map `f` at `theta`.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient map `θ ↦ g(θ)`. Pass `−∇ℓ` to obtain the observed information.
/// - `theta`: `&Theta`
///   Evaluation point; its length fixes the `n × n` shape.
///
/// Returns
/// -------
/// `OptResult<Hessian>`
///   Symmetrized matrix with finite entries.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` / `InvalidHessian` when the forward
///   fallback also fails validation. The central-difference error is
///   discarded.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let central = theta.central_hessian(f);
    let mut hess = match validate_hessian(&central, dim) {
        Ok(()) => central,
        Err(_) => {
            let forward = theta.forward_hessian(f);
            validate_hessian(&forward, dim)?;
            forward
        }
    };
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// ---- Helper methods ----

/// Replace each off-diagonal pair by its average.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
