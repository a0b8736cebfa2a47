//! Public entry point of the maximizer.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` starting from `theta0` with L-BFGS.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Objective implementing [`LogLikelihood`].
/// - `theta0`: `Theta`
///   Starting point; validated with [`LogLikelihood::check`] first.
/// - `data`: `&F::Data`
///   State the objective is evaluated against.
/// - `opts`: `&MLEOptions`
///   Tolerances, line search, memory, and verbosity.
///
/// Returns
/// -------
/// `OptResult<OptimOutcome>`
///   Best parameters, the maximized `ℓ(θ̂)` (not the cost), and run metadata.
///
/// Errors
/// ------
/// - Any `OptError` from `check`, solver construction, or the run itself.
///   Errors raised inside the objective are recovered from argmin's error
///   type unchanged.
///
/// Example
/// -------
/// ```ignore
/// use rust_kmatrix::optimization::loglik_optimizer::{maximize, MLEOptions};
///
/// let outcome = maximize(&objective, theta0, &state, &MLEOptions::default())?;
/// println!("ℓ(θ̂) = {}", outcome.value);
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
