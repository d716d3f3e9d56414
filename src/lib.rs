//! rust_logdensity — numerically stable multivariate normal log-densities.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the log-density evaluator to Python via the `_rust_logdensity`
//! extension module. The crate exists to make one point concrete: samplers
//! and optimizers should be handed `ln p(x)` computed in log-space, not
//! `p(x)` and not `ln(p(x))` computed after the fact.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`density` and `optimization`) as the
//!   public crate surface.
//! - Define the `LogDensity` `#[pyclass]` wrapper and the `#[pymodule]`
//!   initializer when the `python-bindings` feature is enabled.
//! - Register the `density` Python submodule under `rust_logdensity` so that
//!   dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in [`density`]; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - The Python-visible class mirrors the invariants of
//!   [`LogDensityEvaluator`](crate::density::LogDensityEvaluator): once
//!   constructed it is immutable.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are propagated as [`density::DensityError`]
//!   internally and converted to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`density`] directly and can ignore
//!   the items guarded by the `python-bindings` feature.
//! - Gradient-based Rust optimizers can wrap an evaluator in
//!   [`optimization::NegLogDensity`].
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by `tests/integration_log_density.rs`.

pub mod density;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    density::{EvaluatorOptions, LogDensityEvaluator},
    utils::{extract_f64_array, extract_f64_matrix},
};

/// LogDensity — Python-facing wrapper for [`LogDensityEvaluator`].
///
/// Purpose
/// -------
/// Let Python callers (notebooks, samplers such as emcee) build a
/// multivariate normal log-density once and query it repeatedly without
/// leaving log-space.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `LogDensity(mean, covariance, symmetry_tol=None, singular_tol=None)`:
/// - `mean`: 1-D array-like of `float64`, length `N ≥ 1`.
/// - `covariance`: 2-D array-like, `N×N`, symmetric positive-definite.
/// - `symmetry_tol`, `singular_tol`: optional overrides of
///   [`EvaluatorOptions`] defaults.
///
/// Fields
/// ------
/// - `inner`: [`LogDensityEvaluator`]
///   Rust-side evaluator that owns the cached inverse and constant.
///
/// Notes
/// -----
/// - `log_density_naive` is exposed so notebooks can show the underflow
///   side by side with the stable result.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_logdensity.density", name = "LogDensity")]
pub struct PyLogDensity {
    inner: LogDensityEvaluator,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyLogDensity {
    #[new]
    #[pyo3(
        text_signature = "(mean, covariance, /, symmetry_tol=None, singular_tol=None)",
        signature = (mean, covariance, symmetry_tol = None, singular_tol = None)
    )]
    pub fn new<'py>(
        py: Python<'py>, mean: &Bound<'py, PyAny>, covariance: &Bound<'py, PyAny>,
        symmetry_tol: Option<f64>, singular_tol: Option<f64>,
    ) -> PyResult<PyLogDensity> {
        let defaults = EvaluatorOptions::default();
        let opts = EvaluatorOptions::new(
            symmetry_tol.unwrap_or(defaults.symmetry_tol),
            singular_tol.unwrap_or(defaults.singular_tol),
        )?;
        let mean = extract_f64_array(py, mean)?.as_array().to_owned();
        let covariance = extract_f64_matrix(covariance)?;
        let inner = LogDensityEvaluator::with_options(mean, covariance, opts)?;
        Ok(PyLogDensity { inner })
    }

    /// Stable log-density at `point`.
    pub fn log_density<'py>(&self, py: Python<'py>, point: &Bound<'py, PyAny>) -> PyResult<f64> {
        let arr = extract_f64_array(py, point)?;
        Ok(self.inner.log_density(arr.as_array())?)
    }

    /// Exponentiate-then-log reference; returns `-inf` once the density
    /// underflows.
    pub fn log_density_naive<'py>(
        &self, py: Python<'py>, point: &Bound<'py, PyAny>,
    ) -> PyResult<f64> {
        let arr = extract_f64_array(py, point)?;
        Ok(self.inner.log_density_naive(arr.as_array())?)
    }

    /// Stable log-density for each row of a 2-D array of points.
    pub fn log_density_batch<'py>(
        &self, py: Python<'py>, points: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let points = extract_f64_matrix(points)?;
        Ok(self.inner.log_density_batch(points.view())?.into_pyarray(py))
    }

    /// Gradient `Σ⁻¹(μ − x)` of the log-density.
    pub fn grad_log_density<'py>(
        &self, py: Python<'py>, point: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let arr = extract_f64_array(py, point)?;
        Ok(self.inner.grad_log_density(arr.as_array())?.into_pyarray(py))
    }

    #[getter]
    pub fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    #[getter]
    pub fn log_normalization_constant(&self) -> f64 {
        self.inner.log_normalization_constant()
    }

    #[getter]
    pub fn mean<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.mean().clone().into_pyarray(py)
    }

    #[getter]
    pub fn inverse_covariance<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.inverse_covariance().clone().into_pyarray(py)
    }
}

/// _rust_logdensity — PyO3 module initializer for the Python extension.
///
/// Purpose
/// -------
/// Define the `_rust_logdensity` Python module, attach the `density`
/// submodule, and register it in `sys.modules` so that
/// `import rust_logdensity.density` resolves.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_logdensity(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    let density_mod = PyModule::new(py, "density")?;
    density_mod.add_class::<PyLogDensity>()?;
    m.add_submodule(&density_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    py.import("sys")?.getattr("modules")?.set_item("rust_logdensity.density", density_mod)?;
    Ok(())
}
