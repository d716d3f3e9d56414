//! density — numerically stable multivariate normal log-densities.
//!
//! Purpose
//! -------
//! Evaluate `ln p(x)` for a multivariate normal `N(μ, Σ)` of arbitrary
//! dimension without ever forming `p(x)` itself. Optimizers and Monte Carlo
//! samplers should be handed this log-density as their objective: the raw
//! density underflows to zero a few dozen standard deviations from the mean,
//! after which `ln` can only return `-∞`.
//!
//! Key behaviors
//! -------------
//! - [`LogDensityEvaluator`] validates `(μ, Σ)` once, caches `Σ⁻¹` and the
//!   log normalization constant, and evaluates the stable log-density in
//!   `O(N²)` per point.
//! - [`LogDensityEvaluator::log_density_naive`] keeps the exponentiate-then-log
//!   evaluation order for comparison and regression tests.
//! - [`EvaluatorOptions`] configures the symmetry and singularity tolerances
//!   applied at construction.
//! - [`DensityError`] / [`DensityResult`] report every construction and
//!   evaluation failure.
//!
//! Invariants & assumptions
//! ------------------------
//! - An evaluator only exists for a finite, symmetric, positive-definite
//!   covariance whose size matches the mean.
//! - All routines return [`DensityError`] on failure instead of panicking.
//!
//! Conventions
//! -----------
//! - Vectors and matrices are `ndarray` types; `nalgebra` is used internally
//!   for the factorizations only.
//! - Logging happens only through `diagnostics` with the `obs_slog`
//!   feature enabled.
//!
//! Downstream usage
//! ----------------
//! - Build one evaluator per distribution and share it by reference.
//! - Gradient-based optimizers can consume it through
//!   [`crate::optimization::NegLogDensity`].
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own branches; the
//!   crate-level integration tests exercise the full construct-then-query
//!   workflow.

#[cfg(feature = "obs_slog")]
pub mod diagnostics;
pub mod errors;
pub mod evaluator;
pub mod linalg;
pub mod options;
pub mod validation;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{DensityError, DensityResult};
pub use self::evaluator::LogDensityEvaluator;
pub use self::options::EvaluatorOptions;

// ---- Optional convenience prelude for downstream crates ------------------
//
// Downstream crates can `use rust_logdensity::density::prelude::*;` to
// import the primary density surface in a single line.

pub mod prelude {
    pub use super::errors::{DensityError, DensityResult};
    pub use super::evaluator::LogDensityEvaluator;
    pub use super::options::EvaluatorOptions;
}
