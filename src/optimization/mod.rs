//! optimization — hand a log-density to `argmin` optimizers.
//!
//! Purpose
//! -------
//! Provide the call contract between a [`LogDensityEvaluator`] and external
//! gradient-based optimizers. Optimizers should always be given the
//! log-density (negated into a cost), never the raw density, so that
//! starting points far from the mode still produce finite costs and useful
//! gradients.
//!
//! Key behaviors
//! -------------
//! - [`NegLogDensity`] implements `argmin`'s `CostFunction`, `Gradient` and
//!   `Hessian` on `ndarray::Array1<f64>` parameters.
//! - [`OptError`] carries density failures through
//!   `argmin::core::Error` and maps `argmin`'s own errors back.
//!
//! Conventions
//! -----------
//! - No solver is configured or run here; callers pick an `argmin` solver
//!   and an `Executor` themselves.
//!
//! [`LogDensityEvaluator`]: crate::density::LogDensityEvaluator

pub mod adapter;
pub mod errors;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::adapter::NegLogDensity;
pub use self::errors::OptError;
