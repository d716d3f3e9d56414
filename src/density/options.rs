//! density::options — numerical tolerances used at construction time.
//!
//! Purpose
//! -------
//! Collect the small set of tolerances that govern how strictly a
//! covariance matrix is screened before an evaluator is built. Keeping them
//! in one validated struct lets callers tighten or relax the checks without
//! touching the evaluator itself.
//!
//! Conventions
//! -----------
//! - Options are plain `Copy` values, validated in [`EvaluatorOptions::new`]
//!   and again when an evaluator is built from them.
//! - [`Default`] yields the tolerances used by
//!   [`LogDensityEvaluator::new`](crate::density::evaluator::LogDensityEvaluator::new).

use crate::density::errors::{DensityError, DensityResult};

/// Default relative tolerance for the covariance symmetry check.
pub const DEFAULT_SYMMETRY_TOL: f64 = 1e-10;

/// Default relative tolerance on the smallest LU pivot.
///
/// A covariance is singular when `min|pivot| ≤ tol · max|pivot|`. A value of
/// zero still rejects pivots at rounding level (`N·ε` relative).
pub const DEFAULT_SINGULAR_TOL: f64 = 1e-12;

/// EvaluatorOptions — covariance screening tolerances.
///
/// Fields
/// ------
/// - `symmetry_tol`: `f64`
///   Relative tolerance for
///   `|Σᵢⱼ − Σⱼᵢ| ≤ symmetry_tol · max(|Σᵢⱼ|, |Σⱼᵢ|, 1)`.
/// - `singular_tol`: `f64`
///   The covariance is treated as singular when the smallest absolute LU
///   pivot is `≤ max(singular_tol, N·ε)` times the largest one.
///
/// Invariants
/// ----------
/// - Both tolerances are finite and non-negative. The fields are public, so
///   the evaluator re-checks them through [`EvaluatorOptions::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorOptions {
    pub symmetry_tol: f64,
    pub singular_tol: f64,
}

impl EvaluatorOptions {
    /// Construct validated options.
    ///
    /// Errors
    /// ------
    /// - `DensityError::InvalidOption`
    ///   Returned when either tolerance is negative, NaN, or infinite.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_logdensity::density::options::EvaluatorOptions;
    /// let opts = EvaluatorOptions::new(1e-8, 1e-12).unwrap();
    /// assert_eq!(opts.symmetry_tol, 1e-8);
    /// assert!(EvaluatorOptions::new(-1.0, 0.0).is_err());
    /// ```
    pub fn new(symmetry_tol: f64, singular_tol: f64) -> DensityResult<Self> {
        let opts = Self { symmetry_tol, singular_tol };
        opts.validate()?;
        Ok(opts)
    }

    /// Check both tolerances, e.g. for options built as a struct literal.
    ///
    /// Errors
    /// ------
    /// - `DensityError::InvalidOption` for a negative, NaN, or infinite field.
    pub fn validate(&self) -> DensityResult<()> {
        verify_tol("symmetry_tol", self.symmetry_tol)?;
        verify_tol("singular_tol", self.singular_tol)
    }
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self { symmetry_tol: DEFAULT_SYMMETRY_TOL, singular_tol: DEFAULT_SINGULAR_TOL }
    }
}

// ---- Helper Methods ----

fn verify_tol(name: &'static str, value: f64) -> DensityResult<()> {
    if !value.is_finite() {
        return Err(DensityError::InvalidOption {
            name,
            value,
            reason: "Tolerance must be finite.",
        });
    }
    if value < 0.0 {
        return Err(DensityError::InvalidOption {
            name,
            value,
            reason: "Tolerance must be non-negative.",
        });
    }
    Ok(())
}
