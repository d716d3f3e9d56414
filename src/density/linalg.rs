//! density::linalg — covariance factorization on top of `nalgebra`.
//!
//! Purpose
//! -------
//! Turn a validated `ndarray` covariance into the quantities the evaluator
//! caches: the inverse covariance and `ln(det Σ)`. The heavy lifting is done
//! by `nalgebra`'s LU and Cholesky decompositions; this module handles the
//! `ndarray ↔ nalgebra` copies and maps numerical failures into
//! [`DensityError`] variants.
//!
//! Key behaviors
//! -------------
//! - [`factorize_covariance`] runs an LU decomposition to detect
//!   singularity and form `Σ⁻¹`, checks the sign of `det Σ`, then confirms
//!   positive-definiteness and obtains `ln(det Σ)` from the Cholesky factor.
//! - [`raw_inverse_and_determinant`] recomputes `Σ⁻¹` and the raw (non-log)
//!   `det Σ` with no safeguards beyond invertibility. It exists only for the
//!   naive evaluation path.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs have already passed
//!   [`validate_covariance`](crate::density::validation::validate_covariance):
//!   square, finite, symmetric.
//! - `ln(det Σ)` is never computed as `det(Σ).ln()`; the product of pivots
//!   can underflow or overflow in high dimension while the log stays finite.
//!
//! Conventions
//! -----------
//! - `nalgebra` matrices are column-major; copies iterate by column.
//! - No logging and no global state.

use nalgebra::DMatrix;
use ndarray::Array2;

use crate::density::errors::{DensityError, DensityResult};

/// CovarianceFactors — quantities cached by the evaluator.
///
/// Fields
/// ------
/// - `inverse`: `Array2<f64>`
///   `Σ⁻¹`, symmetric `N×N`.
/// - `log_determinant`: `f64`
///   `ln(det Σ)`, finite.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceFactors {
    pub inverse: Array2<f64>,
    pub log_determinant: f64,
}

/// factorize_covariance — invert `Σ` and compute `ln(det Σ)`.
///
/// Parameters
/// ----------
/// - `covariance`: `&Array2<f64>`
///   Validated square, finite, symmetric covariance.
/// - `singular_tol`: `f64`
///   Relative pivot tolerance. The matrix is treated as singular when
///   `min|uᵢᵢ| ≤ max(singular_tol, N·ε) · max|uᵢᵢ|` over the LU pivots.
///
/// Returns
/// -------
/// `DensityResult<CovarianceFactors>`
///   The inverse and log-determinant on success.
///
/// Errors
/// ------
/// - `DensityError::SingularMatrix`
///   A pivot is negligible relative to the largest pivot, or LU inversion
///   fails. Checked before the sign and Cholesky tests, so a rank-deficient
///   matrix whose rounded pivots come out slightly negative is still
///   reported as singular.
/// - `DensityError::NonPositiveDefinite`
///   The determinant sign is negative, or the Cholesky factorization fails
///   (indefinite matrix with an even number of negative eigenvalues).
///
/// Notes
/// -----
/// - The `N·ε` floor applies even when `singular_tol` is zero: pivots at
///   rounding level carry no information about the sign of `det Σ`.
/// - The determinant sign is taken from the permutation parity and the
///   signs of the pivots, not from the raw product, so an underflowing
///   `det Σ` of a valid high-dimensional covariance is not mistaken for zero.
pub fn factorize_covariance(
    covariance: &Array2<f64>, singular_tol: f64,
) -> DensityResult<CovarianceFactors> {
    let n = covariance.nrows();
    let mut cov_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(covariance, &mut cov_nalg);

    let lu = cov_nalg.clone().lu();
    let pivots = lu.u().diagonal();
    let min_pivot = pivots.iter().fold(f64::INFINITY, |acc, p| acc.min(p.abs()));
    let max_pivot = pivots.iter().fold(0.0_f64, |acc, p| acc.max(p.abs()));
    let relative_tol = singular_tol.max(n as f64 * f64::EPSILON);
    if min_pivot <= relative_tol * max_pivot {
        return Err(DensityError::SingularMatrix { dimension: n });
    }
    let inverse = lu.try_inverse().ok_or(DensityError::SingularMatrix { dimension: n })?;

    let parity: f64 = lu.p().determinant();
    let sign = pivots.iter().fold(parity, |acc, p| acc * p.signum());
    if sign <= 0.0 {
        return Err(DensityError::NonPositiveDefinite { determinant: lu.determinant() });
    }

    let cholesky = cov_nalg
        .cholesky()
        .ok_or_else(|| DensityError::NonPositiveDefinite { determinant: lu.determinant() })?;
    let log_determinant = cholesky.ln_determinant();

    Ok(CovarianceFactors { inverse: to_array2(&inverse), log_determinant })
}

/// raw_inverse_and_determinant — unguarded `(Σ⁻¹, det Σ)`.
///
/// Used by the naive evaluation path, which recomputes both on every call.
/// The determinant is the plain product of LU pivots and may under- or
/// overflow.
///
/// Errors
/// ------
/// - `DensityError::SingularMatrix` when `nalgebra` cannot invert `Σ`.
pub fn raw_inverse_and_determinant(
    covariance: &Array2<f64>,
) -> DensityResult<(Array2<f64>, f64)> {
    let n = covariance.nrows();
    let mut cov_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(covariance, &mut cov_nalg);
    let determinant = cov_nalg.determinant();
    let inverse = cov_nalg.try_inverse().ok_or(DensityError::SingularMatrix { dimension: n })?;
    Ok((to_array2(&inverse), determinant))
}

// ---- Helper methods ----

/// Copy a square `ndarray` matrix into a preallocated `DMatrix`, column by
/// column to match `nalgebra`'s storage order.
fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    let n = src.ncols();
    for j in 0..n {
        for i in 0..n {
            dst[(i, j)] = src[[i, j]];
        }
    }
}

fn to_array2(src: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((src.nrows(), src.ncols()), |(i, j)| src[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Faithful copying between `ndarray` and `DMatrix`.
    // - Inverse and log-determinant of small SPD matrices with known values.
    // - Singular (exact and rounded), negative-determinant and indefinite
    //   inputs.
    // - Log-determinant in a dimension where the raw determinant underflows.
    //
    // They intentionally DO NOT cover:
    // - Shape or symmetry problems, which are rejected by `validation`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `fill_dmatrix` preserves every entry, including asymmetric ones.
    fn fill_dmatrix_copies_entries_without_modification() {
        // Arrange
        let src = array![[2.0, 0.5], [0.25, 1.0]];
        let mut dst = DMatrix::<f64>::zeros(2, 2);

        // Act
        fill_dmatrix(&src, &mut dst);

        // Assert
        assert_eq!(dst[(0, 0)], 2.0);
        assert_eq!(dst[(0, 1)], 0.5);
        assert_eq!(dst[(1, 0)], 0.25);
        assert_eq!(dst[(1, 1)], 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Check inverse and log-determinant for a correlated 2×2 SPD matrix.
    //
    // Given
    // -----
    // - Σ = [[2, 1], [1, 2]], det = 3, Σ⁻¹ = (1/3)[[2, -1], [-1, 2]].
    //
    // Expect
    // ------
    // - `log_determinant ≈ ln 3` and the inverse matches entrywise.
    fn factorize_covariance_matches_closed_form_2x2() {
        // Arrange
        let cov = array![[2.0, 1.0], [1.0, 2.0]];

        // Act
        let factors = factorize_covariance(&cov, 0.0).unwrap();

        // Assert
        assert_relative_eq!(factors.log_determinant, 3.0_f64.ln(), epsilon = 1e-14);
        let expected = array![[2.0 / 3.0, -1.0 / 3.0], [-1.0 / 3.0, 2.0 / 3.0]];
        for (got, want) in factors.inverse.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-14);
        }
    }

    #[test]
    // Purpose
    // -------
    // The all-zeros matrix is singular.
    fn factorize_covariance_all_zeros_is_singular() {
        let cov = Array2::<f64>::zeros((3, 3));
        let expected = Err(DensityError::SingularMatrix { dimension: 3 });
        assert_eq!(factorize_covariance(&cov, 0.0), expected);
    }

    #[test]
    // Purpose
    // -------
    // A rank-deficient (positive-semidefinite) matrix is reported as singular.
    //
    // Given
    // -----
    // - Σ = [[1, 1], [1, 1]] with eigenvalues {0, 2}.
    //
    // Expect
    // ------
    // - `SingularMatrix { dimension: 2 }`.
    fn factorize_covariance_semidefinite_is_singular() {
        let cov = array![[1.0, 1.0], [1.0, 1.0]];
        let expected = Err(DensityError::SingularMatrix { dimension: 2 });
        assert_eq!(factorize_covariance(&cov, 0.0), expected);
    }

    #[test]
    // Purpose
    // -------
    // A relative `singular_tol` rejects nearly singular matrices that LU could
    // still invert, and scales with the matrix.
    //
    // Given
    // -----
    // - diag(1, 1e-14) and the same matrix multiplied by 1e-20.
    //
    // Expect
    // ------
    // - Accepted with `singular_tol = 0`, rejected with `1e-12` at both scales.
    fn factorize_covariance_respects_singular_tolerance() {
        // Arrange
        let cov = array![[1.0, 0.0], [0.0, 1e-14]];
        let tiny = &cov * 1e-20;
        let expected = Err(DensityError::SingularMatrix { dimension: 2 });

        // Act / Assert
        assert!(factorize_covariance(&cov, 0.0).is_ok());
        assert!(factorize_covariance(&tiny, 0.0).is_ok());
        assert_eq!(factorize_covariance(&cov, 1e-12), expected);
        assert_eq!(factorize_covariance(&tiny, 1e-12), expected);
    }

    #[test]
    // Purpose
    // -------
    // Rank-deficient matrices whose last pivot is rounding noise rather than
    // an exact zero are still reported as singular, not as indefinite.
    //
    // Given
    // -----
    // - Σ = [[2, 1, 3], [1, 1, 2], [3, 2, 5]] (row 3 = row 1 + row 2); the
    //   rounded LU determinant is about -3.3e-16.
    // - A rank-2 4×4 Gram matrix Σ = A·Aᵀ with
    //   A = [[1, 2], [0, 1], [3, -1], [2, 2]].
    //
    // Expect
    // ------
    // - `SingularMatrix` for both, even with `singular_tol = 0`.
    fn factorize_covariance_rounded_rank_deficiency_is_singular() {
        // Arrange
        let dependent_rows = array![[2.0, 1.0, 3.0], [1.0, 1.0, 2.0], [3.0, 2.0, 5.0]];
        let a = array![[1.0, 2.0], [0.0, 1.0], [3.0, -1.0], [2.0, 2.0]];
        let gram = a.dot(&a.t());

        // Act
        let first = factorize_covariance(&dependent_rows, 0.0);
        let second = factorize_covariance(&gram, 0.0);

        // Assert
        assert_eq!(first, Err(DensityError::SingularMatrix { dimension: 3 }));
        assert_eq!(second, Err(DensityError::SingularMatrix { dimension: 4 }));
    }

    #[test]
    // Purpose
    // -------
    // Negative determinants and even-count indefinite matrices are rejected as
    // non-positive-definite.
    //
    // Given
    // -----
    // - diag(1, -1): det = -1.
    // - diag(-1, -2): det = 2 > 0 but not positive-definite.
    //
    // Expect
    // ------
    // - `NonPositiveDefinite` with determinants -1 and 2.
    fn factorize_covariance_indefinite_is_non_positive_definite() {
        // Arrange
        let negative_det = array![[1.0, 0.0], [0.0, -1.0]];
        let negative_def = array![[-1.0, 0.0], [0.0, -2.0]];

        // Act / Assert
        match factorize_covariance(&negative_det, 0.0) {
            Err(DensityError::NonPositiveDefinite { determinant }) => {
                assert_relative_eq!(determinant, -1.0, epsilon = 1e-14)
            }
            other => panic!("expected NonPositiveDefinite, got {other:?}"),
        }
        match factorize_covariance(&negative_def, 0.0) {
            Err(DensityError::NonPositiveDefinite { determinant }) => {
                assert_relative_eq!(determinant, 2.0, epsilon = 1e-14)
            }
            other => panic!("expected NonPositiveDefinite, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // The log-determinant stays finite when the raw determinant underflows.
    //
    // Given
    // -----
    // - Σ = 1e-4 · I₁₀₀, det = 1e-400 (underflows to 0 in f64).
    //
    // Expect
    // ------
    // - `factorize_covariance` succeeds with `log_determinant ≈ 100 · ln(1e-4)`.
    // - `raw_inverse_and_determinant` reports a determinant of exactly 0.
    fn log_determinant_survives_determinant_underflow() {
        // Arrange
        let cov = Array2::<f64>::eye(100) * 1e-4;

        // Act
        let factors = factorize_covariance(&cov, 0.0).unwrap();
        let (_, raw_det) = raw_inverse_and_determinant(&cov).unwrap();

        // Assert
        assert_relative_eq!(factors.log_determinant, 100.0 * 1e-4_f64.ln(), max_relative = 1e-12);
        assert_eq!(raw_det, 0.0);
    }
}
