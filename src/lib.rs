//! rust_kmatrix — K-matrix resonance amplitudes and extended likelihoods.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the likelihood to Python via the `_rust_kmatrix` extension module
//! (feature `python-bindings`).
//!
//! Key behaviors
//! -------------
//! - [`kmatrix`]: wave configurations, the per-wave K-matrix model, and the
//!   four-wave composite amplitude.
//! - [`likelihood`]: event samples, coupling layouts, setup-time
//!   precomputation, and the extended log-likelihood.
//! - [`optimization`]: L-BFGS maximization, deterministic parallel sums, and
//!   the optimizer error surface.
//! - [`inference`]: standard errors from the observed information.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; the PyO3 items here only
//!   convert inputs, release the GIL around heavy calls, and map errors.
//!
//! Conventions
//! -----------
//! - Python classes live under `_rust_kmatrix.likelihood` and are re-exported
//!   by the thin `rust_kmatrix` Python package.
//! - Rust error types convert to Python `ValueError` at the boundary.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_likelihood_pipeline.rs`; the bindings add no logic of
//!   their own.

pub mod inference;
pub mod kmatrix;
pub mod likelihood;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    kmatrix::models::CompositeAmplitude,
    likelihood::{
        couplings::CouplingLayout,
        data::GeneratedCount,
        evaluator::{DomainPolicy, LikelihoodOptions, ReadyLikelihood, UnconfiguredLikelihood},
    },
    optimization::loglik_optimizer::{Theta, traits::OptimOutcome},
    utils::{extract_event_sample, extract_f64_array, extract_mle_opts},
};

/// KMatrixLikelihood — Python-facing extended likelihood over the standard
/// f0/f2/a0/a2 K-matrix amplitude.
///
/// Parameters
/// ----------
/// Constructed from Python as
/// `KMatrixLikelihood(data_mass, data_theta, data_phi, mc_mass, mc_theta,
/// mc_phi, n_generated, data_weight=None, mc_weight=None, fix_f0_980=None,
/// negative_infinity=False)`:
/// - `*_mass`: invariant masses in GeV (squared internally).
/// - `*_theta`, `*_phi`: helicity angles in radians.
/// - `n_generated`: number of generated MC events (> 0).
/// - `fix_f0_980`: `None` for the 23-parameter layout, or a magnitude
///   (conventionally 100) for the 22-parameter layout.
/// - `negative_infinity`: return `-inf` instead of raising when a data
///   intensity is non-positive.
///
/// Notes
/// -----
/// - Setup runs inside the constructor; events whose K-matrix inversion fails
///   are dropped and counted in `n_dropped`.
/// - `log_likelihood` is cheap enough to hand directly to `emcee`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_kmatrix.likelihood")]
pub struct KMatrixLikelihood {
    inner: ReadyLikelihood,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl KMatrixLikelihood {
    #[new]
    #[pyo3(
        signature = (
            data_mass, data_theta, data_phi, mc_mass, mc_theta, mc_phi, n_generated,
            data_weight = None, mc_weight = None, fix_f0_980 = None, negative_infinity = false
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        py: Python<'py>, data_mass: &Bound<'py, PyAny>, data_theta: &Bound<'py, PyAny>,
        data_phi: &Bound<'py, PyAny>, mc_mass: &Bound<'py, PyAny>, mc_theta: &Bound<'py, PyAny>,
        mc_phi: &Bound<'py, PyAny>, n_generated: usize, data_weight: Option<&Bound<'py, PyAny>>,
        mc_weight: Option<&Bound<'py, PyAny>>, fix_f0_980: Option<f64>, negative_infinity: bool,
    ) -> PyResult<Self> {
        let data = extract_event_sample(py, data_mass, data_theta, data_phi, data_weight)?;
        let accepted = extract_event_sample(py, mc_mass, mc_theta, mc_phi, mc_weight)?;
        let layout = match fix_f0_980 {
            Some(mag) => CouplingLayout::fixed_f0_980(mag)?,
            None => CouplingLayout::free_f0_980(),
        };
        let policy =
            if negative_infinity { DomainPolicy::NegativeInfinity } else { DomainPolicy::Fail };
        let options = LikelihoodOptions { policy, ..LikelihoodOptions::default() };
        let amplitude = CompositeAmplitude::standard()?;

        let inner = py.allow_threads(|| {
            UnconfiguredLikelihood::new(
                amplitude,
                layout,
                options,
                &data,
                &accepted,
                &GeneratedCount(n_generated),
            )
            .map(UnconfiguredLikelihood::setup)
        })?;
        Ok(Self { inner })
    }

    /// Extended log-likelihood at `params`.
    pub fn log_likelihood<'py>(&self, py: Python<'py>, params: &Bound<'py, PyAny>) -> PyResult<f64> {
        let params = extract_f64_array(py, params)?;
        let params = params.as_slice()?.to_vec();
        Ok(py.allow_threads(|| self.inner.extended_log_likelihood(&params))?)
    }

    /// Analytic gradient of the log-likelihood at `params`.
    pub fn gradient<'py>(
        &self, py: Python<'py>, params: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let params = extract_f64_array(py, params)?;
        let params = params.as_slice()?.to_vec();
        let grad = py.allow_threads(|| self.inner.gradient(&params))?;
        Ok(grad.into_pyarray(py))
    }

    /// Maximize the log-likelihood from `theta0` with L-BFGS.
    #[pyo3(
        signature = (
            theta0, tol_grad = Some(1e-6), tol_cost = None, max_iter = Some(300),
            line_searcher = None, lbfgs_mem = None, verbose = false
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn fit<'py>(
        &self, py: Python<'py>, theta0: &Bound<'py, PyAny>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>, verbose: bool,
    ) -> PyResult<FitOutcome> {
        let opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem, verbose)?;
        let theta0 = extract_f64_array(py, theta0)?.as_array().to_owned();
        let outcome = py.allow_threads(|| self.inner.fit(theta0, &opts))?;
        Ok(FitOutcome { inner: outcome })
    }

    /// Classical standard errors at `theta_hat`.
    pub fn standard_errors<'py>(
        &self, py: Python<'py>, theta_hat: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let theta_hat: Theta = extract_f64_array(py, theta_hat)?.as_array().to_owned();
        let se = py.allow_threads(|| self.inner.standard_errors(&theta_hat))?;
        Ok(se.into_pyarray(py))
    }

    #[getter]
    pub fn parameter_names(&self) -> Vec<String> {
        self.inner.parameter_names()
    }

    #[getter]
    pub fn n_params(&self) -> usize {
        self.inner.n_params()
    }

    #[getter]
    pub fn n_data(&self) -> usize {
        self.inner.n_data()
    }

    #[getter]
    pub fn n_mc(&self) -> usize {
        self.inner.n_mc()
    }

    #[getter]
    pub fn n_generated(&self) -> usize {
        self.inner.n_generated()
    }

    #[getter]
    pub fn n_dropped(&self) -> usize {
        self.inner.report().n_dropped()
    }
}

/// FitOutcome — read-only view of an [`OptimOutcome`] for Python.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_kmatrix.likelihood")]
pub struct FitOutcome {
    pub inner: OptimOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FitOutcome {
    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat.to_vec()
    }

    #[getter]
    pub fn value(&self) -> f64 {
        self.inner.value
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        self.inner.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

/// _rust_kmatrix — PyO3 module initializer.
///
/// Creates the `likelihood` submodule, attaches it to `_rust_kmatrix`, and
/// registers it in `sys.modules` so `rust_kmatrix.likelihood` imports work.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_kmatrix<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let likelihood_mod = PyModule::new(py, "likelihood")?;
    likelihood_mod.add_class::<KMatrixLikelihood>()?;
    likelihood_mod.add_class::<FitOutcome>()?;
    m.add_submodule(&likelihood_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    py.import("sys")?.getattr("modules")?.set_item("rust_kmatrix.likelihood", likelihood_mod)?;
    Ok(())
}
