//! Adapter that exposes a [`LogDensityEvaluator`] as an `argmin` problem.
//!
//! Optimizers minimize, so the cost is the negative log-density
//! `c(x) = -ln p(x)`. The analytic gradient and Hessian are negated
//! accordingly: `∇c(x) = Σ⁻¹(x − μ)` and `∇²c(x) = Σ⁻¹`. Because everything
//! is computed in log-space, the cost stays finite and informative far from
//! the mean where `p(x)` itself is zero in `f64`.
use anyhow::Error;
use argmin::core::{CostFunction, Gradient, Hessian};
use ndarray::{Array1, Array2};

use crate::{
    density::{evaluator::LogDensityEvaluator, validation::validate_point},
    optimization::errors::OptError,
};

/// Bridges a borrowed [`LogDensityEvaluator`] to `argmin`'s
/// `CostFunction`, `Gradient` and `Hessian` traits.
///
/// - `CostFunction::cost` returns `-ln p(x)`.
/// - `Gradient::gradient` returns `-∇ln p(x)`.
/// - `Hessian::hessian` returns the cached `Σ⁻¹`.
#[derive(Debug, Clone, Copy)]
pub struct NegLogDensity<'a> {
    pub evaluator: &'a LogDensityEvaluator,
}

impl<'a> NegLogDensity<'a> {
    pub fn new(evaluator: &'a LogDensityEvaluator) -> Self {
        Self { evaluator }
    }
}

impl CostFunction for NegLogDensity<'_> {
    type Param = Array1<f64>;
    type Output = f64;

    /// Evaluate `c(x) = -ln p(x)`.
    ///
    /// # Errors
    /// - `OptError::Density` for a point of the wrong length or with
    ///   non-finite entries.
    /// - `OptError::NonFiniteCost` if the log-density is not finite.
    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.evaluator.log_density(x.view()).map_err(OptError::from)?;
        if !value.is_finite() {
            return Err((OptError::NonFiniteCost { value }).into());
        }
        Ok(-value)
    }
}

impl Gradient for NegLogDensity<'_> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        let grad = self.evaluator.grad_log_density(x.view()).map_err(OptError::from)?;
        Ok(-grad)
    }
}

impl Hessian for NegLogDensity<'_> {
    type Param = Array1<f64>;
    type Hessian = Array2<f64>;

    /// Constant Hessian `Σ⁻¹`; `x` is only checked for shape and finiteness.
    fn hessian(&self, x: &Self::Param) -> Result<Self::Hessian, Error> {
        validate_point(x.view(), self.evaluator.dimension()).map_err(OptError::from)?;
        Ok(self.evaluator.inverse_covariance().clone())
    }
}
