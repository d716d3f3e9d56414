//! density::evaluator — precomputed multivariate normal log-density.
//!
//! Purpose
//! -------
//! Provide [`LogDensityEvaluator`], an immutable object built once from a
//! mean vector and a covariance matrix that evaluates
//!
//! ```text
//! ln p(x) = -(N/2)·ln(2π) - ½·ln(det Σ) - ½·(x − μ)ᵀ Σ⁻¹ (x − μ)
//! ```
//!
//! directly in log-space. Samplers and optimizers that call the log-density
//! millions of times pay for the inversion and the determinant exactly once.
//!
//! Key behaviors
//! -------------
//! - [`LogDensityEvaluator::new`] / [`LogDensityEvaluator::with_options`]
//!   validate the inputs, factorize `Σ`, and cache `Σ⁻¹` and the log
//!   normalization constant.
//! - [`LogDensityEvaluator::log_density`] is the stable path: one quadratic
//!   form plus a cached constant, no exponentials. It is finite for every
//!   finite point of the right dimension.
//! - [`LogDensityEvaluator::log_density_naive`] is the fragile reference
//!   path: it recomputes `Σ⁻¹` and `det Σ`, forms the density with `exp`,
//!   then takes `ln`. Far from the mean the density underflows to zero and
//!   the result is `-∞`. This is kept as-is for comparison.
//! - [`LogDensityEvaluator::log_density_batch`] and
//!   [`LogDensityEvaluator::grad_log_density`] serve vectorized callers and
//!   gradient-based optimizers.
//!
//! Invariants & assumptions
//! ------------------------
//! - `covariance` is symmetric positive-definite for the whole lifetime of
//!   the evaluator; nothing mutates it after construction.
//! - `inverse_covariance` and `log_normalization_constant` are derived from
//!   `covariance` at construction and can never go stale.
//! - `mean.len() == covariance.nrows() == covariance.ncols() == dimension`.
//!
//! Conventions
//! -----------
//! - Query points are borrowed as `ArrayView1<f64>`; callers holding an
//!   `Array1` pass `x.view()`.
//! - All methods take `&self`; the type is `Send + Sync` and can be shared
//!   across threads without locking.
//! - No logging unless the `obs_slog` feature is enabled.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the unit-normal constant, far-point finiteness versus
//!   naive underflow, agreement near the mean, construction failures,
//!   idempotence, batching, gradients, and an independent `statrs` oracle.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use statrs::consts::LN_SQRT_2PI;

use crate::density::{
    errors::{DensityError, DensityResult},
    linalg::{factorize_covariance, raw_inverse_and_determinant},
    options::EvaluatorOptions,
    validation::{validate_covariance, validate_mean, validate_point},
};

/// LogDensityEvaluator — cached log-density of `N(μ, Σ)`.
///
/// Fields
/// ------
/// - `mean`: `Array1<f64>`
///   Distribution center `μ`, length `N`.
/// - `covariance`: `Array2<f64>`
///   Symmetric positive-definite `Σ`, `N×N`. Retained for the naive path.
/// - `inverse_covariance`: `Array2<f64>`
///   `Σ⁻¹`, computed once.
/// - `log_normalization_constant`: `f64`
///   `-N·ln√(2π) - ½·ln(det Σ)`, computed once.
///
/// Invariants
/// ----------
/// - Immutable after construction; every field is consistent with the
///   others.
///
/// Performance
/// -----------
/// - Construction is `O(N³)` (LU + Cholesky).
/// - `log_density` is `O(N²)` and allocates one temporary of length `N`
///   for `Σ⁻¹(μ − x)` plus the difference vector.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDensityEvaluator {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    inverse_covariance: Array2<f64>,
    log_normalization_constant: f64,
}

impl LogDensityEvaluator {
    /// Build an evaluator with default [`EvaluatorOptions`].
    ///
    /// Parameters
    /// ----------
    /// - `mean`: `Array1<f64>`
    ///   Length-`N` mean vector, `N ≥ 1`, finite entries.
    /// - `covariance`: `Array2<f64>`
    ///   `N×N` symmetric positive-definite covariance.
    ///
    /// Returns
    /// -------
    /// `DensityResult<LogDensityEvaluator>`
    ///   A ready-to-query evaluator, or the first violated constraint.
    ///
    /// Errors
    /// ------
    /// - `DensityError::EmptyMean` / `NonFiniteInput`
    ///   Bad mean or covariance entries.
    /// - `DensityError::NotSquare` / `DimensionMismatch`
    ///   Covariance shape inconsistent with the mean.
    /// - `DensityError::NotSymmetric`
    ///   Covariance asymmetric beyond `symmetry_tol`.
    /// - `DensityError::SingularMatrix`
    ///   Covariance cannot be inverted.
    /// - `DensityError::NonPositiveDefinite`
    ///   Covariance invertible but `det Σ ≤ 0` or not positive-definite.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::{Array1, Array2};
    /// # use rust_logdensity::density::evaluator::LogDensityEvaluator;
    /// let eval = LogDensityEvaluator::new(Array1::zeros(2), Array2::eye(2)).unwrap();
    /// let at_mean = eval.log_density(Array1::<f64>::zeros(2).view()).unwrap();
    /// assert!((at_mean + (2.0 * std::f64::consts::PI).ln()).abs() < 1e-12);
    /// ```
    pub fn new(mean: Array1<f64>, covariance: Array2<f64>) -> DensityResult<Self> {
        Self::with_options(mean, covariance, EvaluatorOptions::default())
    }

    /// Build an evaluator with explicit screening tolerances.
    ///
    /// Errors
    /// ------
    /// - Same as [`LogDensityEvaluator::new`].
    /// - `DensityError::InvalidOption` when `opts` carries a negative or
    ///   non-finite tolerance.
    pub fn with_options(
        mean: Array1<f64>, covariance: Array2<f64>, opts: EvaluatorOptions,
    ) -> DensityResult<Self> {
        opts.validate()?;
        let n = validate_mean(mean.view())?;
        validate_covariance(&covariance, n, opts.symmetry_tol)?;
        let factors = factorize_covariance(&covariance, opts.singular_tol)?;

        let log_normalization_constant =
            -(n as f64) * LN_SQRT_2PI - 0.5 * factors.log_determinant;

        #[cfg(feature = "obs_slog")]
        crate::density::diagnostics::log_constructed(
            n,
            factors.log_determinant,
            log_normalization_constant,
        );

        Ok(Self {
            mean,
            covariance,
            inverse_covariance: factors.inverse,
            log_normalization_constant,
        })
    }

    /// Dimension `N` of the distribution.
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Cached `Σ⁻¹`.
    pub fn inverse_covariance(&self) -> &Array2<f64> {
        &self.inverse_covariance
    }

    /// Cached `-(N/2)·ln(2π) - ½·ln(det Σ)`.
    pub fn log_normalization_constant(&self) -> f64 {
        self.log_normalization_constant
    }

    /// Squared Mahalanobis distance `(x − μ)ᵀ Σ⁻¹ (x − μ)` using the cached
    /// inverse.
    ///
    /// The difference `μ − x` is formed after scaling both operands by a
    /// power of two, so it cannot overflow for finite inputs. The result is
    /// non-negative and may be `+∞`, never NaN.
    ///
    /// Errors
    /// ------
    /// - `DensityError::DimensionMismatch` when `point.len() != N`.
    /// - `DensityError::NonFiniteInput` when `point` has NaN or ±∞.
    pub fn quadratic_form(&self, point: ArrayView1<f64>) -> DensityResult<f64> {
        validate_point(point, self.dimension())?;
        let (delta, scale) = scaled_difference(&self.mean, point);
        let reduced = delta.dot(&self.inverse_covariance.dot(&delta));
        // NaN here can only come from an overflowing product.
        let reduced = if reduced.is_nan() { f64::INFINITY } else { reduced.max(0.0) };
        Ok(reduced * scale * scale)
    }

    /// log_density — numerically stable `ln p(x)`.
    ///
    /// Purpose
    /// -------
    /// Evaluate the log-density using only cached quantities:
    /// `log_normalization_constant - ½·(μ − x)ᵀ Σ⁻¹ (μ − x)`.
    ///
    /// Parameters
    /// ----------
    /// - `point`: `ArrayView1<f64>`
    ///   Query point of length `N` with finite entries.
    ///
    /// Returns
    /// -------
    /// `DensityResult<f64>`
    ///   A finite log-density. Points far from the mean produce large
    ///   negative values rather than `-∞`; only a squared distance beyond
    ///   `f64::MAX` yields `-∞`. Never NaN.
    ///
    /// Errors
    /// ------
    /// - `DensityError::DimensionMismatch` when `point.len() != N`.
    /// - `DensityError::NonFiniteInput` when `point` has NaN or ±∞.
    ///
    /// Notes
    /// -----
    /// - Pure: repeated calls with the same point return bit-identical
    ///   results.
    pub fn log_density(&self, point: ArrayView1<f64>) -> DensityResult<f64> {
        let q = self.quadratic_form(point)?;
        Ok(self.log_normalization_constant - 0.5 * q)
    }

    /// log_density_naive — reference `ln(p(x))` computed through `exp`.
    ///
    /// Purpose
    /// -------
    /// Reproduce the textbook evaluation order: recompute `Σ⁻¹` and `det Σ`,
    /// form `p(x) = (2π)^(-N/2)·det(Σ)^(-1/2)·exp(-½q)`, then return
    /// `ln(p(x))`. Nothing here is cached or guarded.
    ///
    /// Returns
    /// -------
    /// `DensityResult<f64>`
    ///   Agrees with [`log_density`](Self::log_density) near the mean. Once
    ///   `exp(-½q)` underflows the result is `-∞`; an underflowing or
    ///   overflowing `det Σ` yields `±∞` or NaN. These values are returned,
    ///   not raised.
    ///
    /// Errors
    /// ------
    /// - `DensityError::DimensionMismatch` / `NonFiniteInput` on a bad point.
    /// - `DensityError::SingularMatrix` if re-inversion fails, which cannot
    ///   happen for a covariance that passed construction.
    pub fn log_density_naive(&self, point: ArrayView1<f64>) -> DensityResult<f64> {
        validate_point(point, self.dimension())?;
        let (inverse, determinant) = raw_inverse_and_determinant(&self.covariance)?;

        let n = self.dimension() as f64;
        let normalization =
            1.0 / ((2.0 * std::f64::consts::PI).powf(n / 2.0) * determinant.sqrt());
        let delta = &self.mean - &point;
        let q = delta.dot(&inverse.dot(&delta));
        let density = normalization * (-0.5 * q).exp();
        let value = density.ln();

        #[cfg(feature = "obs_slog")]
        if !value.is_finite() {
            crate::density::diagnostics::log_naive_underflow(q, value);
        }

        Ok(value)
    }

    /// Stable log-density for each row of `points`.
    ///
    /// Errors
    /// ------
    /// - `DensityError::DimensionMismatch { what: "points", .. }` when
    ///   `points.ncols() != N`.
    /// - `DensityError::NonFiniteInput` for the first row holding a NaN or
    ///   ±∞ (the index is relative to that row).
    pub fn log_density_batch(&self, points: ArrayView2<f64>) -> DensityResult<Array1<f64>> {
        if points.ncols() != self.dimension() {
            return Err(DensityError::DimensionMismatch {
                what: "points",
                expected: self.dimension(),
                found: points.ncols(),
            });
        }
        let values = points
            .outer_iter()
            .map(|row| self.log_density(row))
            .collect::<DensityResult<Vec<f64>>>()?;
        Ok(Array1::from(values))
    }

    /// Gradient of the log-density, `∇ ln p(x) = Σ⁻¹ (μ − x)`.
    ///
    /// Errors
    /// ------
    /// - Same as [`log_density`](Self::log_density).
    pub fn grad_log_density(&self, point: ArrayView1<f64>) -> DensityResult<Array1<f64>> {
        validate_point(point, self.dimension())?;
        let (delta, scale) = scaled_difference(&self.mean, point);
        Ok(self.inverse_covariance.dot(&delta) * scale)
    }
}

// ---- Helper methods ----

/// Return `(d, s)` with `μ − x = s·d`, where `s` is a power of two chosen
/// so that `|dᵢ| ≤ 4`. Scaling by a power of two is exact, so for moderate
/// inputs `d` is bit-identical to `μ − x` when `s = 1` and an exact rescaling
/// of it otherwise.
fn scaled_difference(mean: &Array1<f64>, point: ArrayView1<f64>) -> (Array1<f64>, f64) {
    let magnitude = mean.iter().chain(point.iter()).fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if magnitude <= 1.0 {
        return (mean - &point, 1.0);
    }
    // log2(f64::MAX) rounds to 1024; 2^1024 is not representable.
    let exponent = magnitude.log2().floor().min(1023.0) as i32;
    let scale = 2.0_f64.powi(exponent);
    let delta = mean.mapv(|m| m / scale) - point.mapv(|x| x / scale);
    (delta, scale)
}
