//! density::errors — error type and Python bridge for log-density evaluation.
//!
//! Purpose
//! -------
//! Define [`DensityError`] and the [`DensityResult`] alias used by every
//! construction and evaluation routine in the `density` subtree. Each
//! variant carries just enough payload (sizes, indices, offending values)
//! to explain the failure without holding on to caller data.
//!
//! Key behaviors
//! -------------
//! - Distinguish caller-correctable shape errors (`DimensionMismatch`,
//!   `NotSquare`, `EmptyMean`) from numerical rejections of the covariance
//!   (`SingularMatrix`, `NonPositiveDefinite`, `NotSymmetric`).
//! - Provide human-readable `Display` messages phrased in terms of the
//!   violated constraint.
//! - Map every variant to a Python `ValueError` when the
//!   `python-bindings` feature is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Construction errors are fatal to that construction attempt; no partial
//!   evaluator is ever returned alongside an error.
//! - Evaluation errors are limited to malformed query points
//!   (`DimensionMismatch`, `NonFiniteInput`); the naive path reports
//!   underflow through its return value, never through this type.
//!
//! Testing notes
//! -------------
//! - Unit tests below check payload embedding in `Display` output and the
//!   `is_dimension_mismatch` classification.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type DensityResult<T> = Result<T, DensityError>;

/// DensityError — failures raised while building or querying an evaluator.
///
/// Variants
/// --------
/// - `DimensionMismatch { what, expected, found }`
///   A vector or matrix side has the wrong length. `what` names the
///   argument (`"covariance"`, `"point"`, `"points"`).
/// - `NotSquare { rows, cols }`
///   The covariance matrix is not square.
/// - `EmptyMean`
///   The mean vector has length zero; the dimension must be at least 1.
/// - `NonFiniteInput { what, index, value }`
///   An entry of `what` is NaN or ±∞. For matrices, `index` is the
///   row-major flat index.
/// - `NotSymmetric { row, col, diff }`
///   `|Σ[row, col] − Σ[col, row]|` exceeds the configured tolerance.
/// - `SingularMatrix { dimension }`
///   The covariance has no numerically usable inverse.
/// - `NonPositiveDefinite { determinant }`
///   The covariance is invertible but not positive-definite, so
///   `ln(det Σ)` or the Cholesky factor is undefined.
/// - `InvalidOption { name, value, reason }`
///   An [`EvaluatorOptions`](crate::density::options::EvaluatorOptions)
///   field is out of range.
#[derive(Debug, Clone, PartialEq)]
pub enum DensityError {
    // ---- Shape ----
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    NotSquare {
        rows: usize,
        cols: usize,
    },
    EmptyMean,

    // ---- Values ----
    NonFiniteInput {
        what: &'static str,
        index: usize,
        value: f64,
    },
    NotSymmetric {
        row: usize,
        col: usize,
        diff: f64,
    },

    // ---- Covariance ----
    SingularMatrix {
        dimension: usize,
    },
    NonPositiveDefinite {
        determinant: f64,
    },

    // ---- Options ----
    InvalidOption {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl DensityError {
    /// True for every variant that reports inconsistent sizes, including a
    /// non-square covariance.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, DensityError::DimensionMismatch { .. } | DensityError::NotSquare { .. })
    }
}

impl std::error::Error for DensityError {}

impl std::fmt::Display for DensityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shape ----
            DensityError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}")
            }
            DensityError::NotSquare { rows, cols } => {
                write!(f, "Covariance must be square, got {rows}x{cols}")
            }
            DensityError::EmptyMean => write!(f, "Mean must contain at least one element"),

            // ---- Values ----
            DensityError::NonFiniteInput { what, index, value } => {
                write!(f, "Invalid {what} entry at index {index}: {value}, must be finite")
            }
            DensityError::NotSymmetric { row, col, diff } => {
                write!(f, "Covariance is not symmetric at ({row}, {col}): |difference| = {diff}")
            }

            // ---- Covariance ----
            DensityError::SingularMatrix { dimension } => {
                write!(
                    f,
                    "Covariance ({dimension}x{dimension}) is singular and cannot be inverted"
                )
            }
            DensityError::NonPositiveDefinite { determinant } => {
                write!(
                    f,
                    "Covariance is not positive-definite (determinant = {determinant}), \
                     log-normalization is undefined"
                )
            }

            // ---- Options ----
            DensityError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = {value}: {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DensityError> for PyErr {
    fn from(err: DensityError) -> PyErr {
        PyValueError::new_err(format!("DensityError: {err}"))
    }
}
