//! PyO3 input helpers shared by the Python bindings.
//!
//! Everything here converts loosely typed Python inputs (numpy arrays,
//! pandas Series, plain sequences) into validated Rust values and maps
//! failures to `PyErr`.
#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    kmatrix::core::numeric::{Float, from_f64},
    likelihood::data::EventSample,
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};

/// Borrow a contiguous 1-D `float64` view of `raw_data`.
///
/// Accepts numpy arrays directly, objects with `to_numpy()` (pandas), and
/// any sequence of floats (copied into a fresh array).
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a Python column into a working-precision array.
#[cfg(feature = "python-bindings")]
pub fn extract_float_column<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<Array1<Float>> {
    let arr = extract_f64_array(py, raw_data)?;
    Ok(arr.as_array().mapv(from_f64))
}

/// Build an [`EventSample`] from invariant-mass and angle columns.
///
/// A missing `weight` means unit weights.
#[cfg(feature = "python-bindings")]
pub fn extract_event_sample<'py>(
    py: Python<'py>, mass: &Bound<'py, PyAny>, theta: &Bound<'py, PyAny>,
    phi: &Bound<'py, PyAny>, weight: Option<&Bound<'py, PyAny>>,
) -> PyResult<EventSample> {
    let mass = extract_float_column(py, mass)?;
    let theta = extract_float_column(py, theta)?;
    let phi = extract_float_column(py, phi)?;
    let weight = match weight {
        Some(w) => extract_float_column(py, w)?,
        None => Array1::ones(mass.len()),
    };
    Ok(EventSample::from_masses(mass, theta, phi, weight)?)
}

/// Optimizer options from keyword arguments; More–Thuente by default.
#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: bool,
) -> PyResult<MLEOptions> {
    let tols = Tolerances::new(tol_grad, tol_cost, max_iter)?;
    let ls = match line_searcher {
        Some(name) => name.parse::<LineSearcher>()?,
        None => LineSearcher::MoreThuente,
    };
    Ok(MLEOptions::new(tols, ls, lbfgs_mem)?.with_verbose(verbose))
}
