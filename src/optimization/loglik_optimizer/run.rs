//! Executor wiring for a configured L-BFGS solver.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter},
};
use argmin::core::{Executor, State};

/// Run `solver` on `problem` from `theta0` and summarize the final state.
///
/// The iteration cap from `opts.tols.max_iter` is applied here. With the
/// `obs_slog` feature and `opts.verbose`, argmin's slog observer reports
/// every iteration to the terminal.
///
/// The returned `value` is `ℓ(θ̂) = −c(θ̂)`.
///
/// Errors
/// ------
/// - Solver failures and objective errors, converted to `OptError`.
/// - Validation failures from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();

    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
