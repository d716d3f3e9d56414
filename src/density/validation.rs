//! density::validation — shape and value guards for evaluator inputs.
//!
//! Purpose
//! -------
//! Centralize the checks shared by construction and evaluation so the
//! numerical code in [`linalg`](crate::density::linalg) and
//! [`evaluator`](crate::density::evaluator) can assume consistent sizes and
//! finite entries.
//!
//! Key behaviors
//! -------------
//! - [`validate_mean`]: non-empty, all entries finite.
//! - [`validate_covariance`]: square, `N×N` with `N = mean.len()`, finite,
//!   and symmetric within a relative tolerance.
//! - [`validate_point`]: length `N`, all entries finite.
//!
//! Conventions
//! -----------
//! - Shape checks run before value checks, so a wrongly sized input is
//!   always reported as a dimension problem.
//! - Matrix indices reported in `NonFiniteInput` are row-major flat indices.
//!
//! Testing notes
//! -------------
//! - Unit tests below exercise every error branch and one success path per
//!   validator.

use ndarray::{Array2, ArrayView1};

use crate::density::errors::{DensityError, DensityResult};

/// Validate the mean vector and return the dimension `N`.
///
/// Errors
/// ------
/// - `DensityError::EmptyMean` when `mean.len() == 0`.
/// - `DensityError::NonFiniteInput` when an entry is NaN or ±∞.
pub fn validate_mean(mean: ArrayView1<f64>) -> DensityResult<usize> {
    if mean.is_empty() {
        return Err(DensityError::EmptyMean);
    }
    check_finite("mean", mean.iter())?;
    Ok(mean.len())
}

/// Validate a covariance matrix against dimension `n`.
///
/// Parameters
/// ----------
/// - `covariance`: `&Array2<f64>`
///   Candidate covariance; must be `n×n`, finite and symmetric.
/// - `n`: `usize`
///   Dimension derived from the mean.
/// - `symmetry_tol`: `f64`
///   Relative tolerance, applied as
///   `|Σᵢⱼ − Σⱼᵢ| ≤ symmetry_tol · max(|Σᵢⱼ|, |Σⱼᵢ|, 1)`.
///
/// Errors
/// ------
/// - `DensityError::NotSquare` when `rows != cols`.
/// - `DensityError::DimensionMismatch` when the square size differs from `n`.
/// - `DensityError::NonFiniteInput` for NaN or ±∞ entries.
/// - `DensityError::NotSymmetric` for the first off-diagonal pair (in
///   row-major order of the upper triangle) outside the tolerance.
pub fn validate_covariance(
    covariance: &Array2<f64>, n: usize, symmetry_tol: f64,
) -> DensityResult<()> {
    let (rows, cols) = covariance.dim();
    if rows != cols {
        return Err(DensityError::NotSquare { rows, cols });
    }
    if rows != n {
        return Err(DensityError::DimensionMismatch {
            what: "covariance",
            expected: n,
            found: rows,
        });
    }
    check_finite("covariance", covariance.iter())?;

    for i in 0..n {
        for j in (i + 1)..n {
            let upper = covariance[[i, j]];
            let lower = covariance[[j, i]];
            let diff = (upper - lower).abs();
            let scale = upper.abs().max(lower.abs()).max(1.0);
            if diff > symmetry_tol * scale {
                return Err(DensityError::NotSymmetric { row: i, col: j, diff });
            }
        }
    }
    Ok(())
}

/// Validate a query point against dimension `n`.
///
/// Errors
/// ------
/// - `DensityError::DimensionMismatch` when `point.len() != n`.
/// - `DensityError::NonFiniteInput` when an entry is NaN or ±∞.
pub fn validate_point(point: ArrayView1<f64>, n: usize) -> DensityResult<()> {
    if point.len() != n {
        return Err(DensityError::DimensionMismatch {
            what: "point",
            expected: n,
            found: point.len(),
        });
    }
    check_finite("point", point.iter())
}

// ---- Helper Methods ----

fn check_finite<'a, I: Iterator<Item = &'a f64>>(
    what: &'static str, values: I,
) -> DensityResult<()> {
    for (index, &value) in values.enumerate() {
        if !value.is_finite() {
            return Err(DensityError::NonFiniteInput { what, index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Empty and non-finite means.
    // - Non-square, wrongly sized, non-finite and asymmetric covariances.
    // - Wrongly sized and non-finite query points.
    //
    // They intentionally DO NOT cover:
    // - Singularity or definiteness, which are decided in `linalg`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A finite, non-empty mean yields its length as the dimension.
    fn validate_mean_returns_dimension() {
        let mean = array![0.0, 1.0, -2.0];
        assert_eq!(validate_mean(mean.view()), Ok(3));
    }

    #[test]
    // Purpose
    // -------
    // Empty means and non-finite entries are rejected.
    //
    // Given
    // -----
    // - An empty vector and a vector with +∞ at index 1.
    //
    // Expect
    // ------
    // - `EmptyMean` and `NonFiniteInput { index: 1, .. }` respectively.
    fn validate_mean_rejects_empty_and_infinite() {
        // Arrange
        let empty = ndarray::Array1::<f64>::zeros(0);
        let infinite = array![0.0, f64::INFINITY];

        // Act / Assert
        assert_eq!(validate_mean(empty.view()), Err(DensityError::EmptyMean));
        match validate_mean(infinite.view()) {
            Err(DensityError::NonFiniteInput { what, index, .. }) => {
                assert_eq!(what, "mean");
                assert_eq!(index, 1);
            }
            other => panic!("expected NonFiniteInput, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A 4-element mean paired with a 3×3 covariance is a dimension mismatch.
    //
    // Given
    // -----
    // - `n = 4` and a 3×3 identity.
    //
    // Expect
    // ------
    // - `DimensionMismatch { expected: 4, found: 3 }`.
    fn validate_covariance_wrong_size_is_dimension_mismatch() {
        // Arrange
        let cov = Array2::<f64>::eye(3);

        // Act
        let result = validate_covariance(&cov, 4, 1e-10);

        // Assert
        assert_eq!(
            result,
            Err(DensityError::DimensionMismatch { what: "covariance", expected: 4, found: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Non-square matrices are reported with both sizes.
    fn validate_covariance_non_square_is_rejected() {
        let cov = Array2::<f64>::zeros((2, 3));
        assert_eq!(
            validate_covariance(&cov, 2, 1e-10),
            Err(DensityError::NotSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // A NaN inside the covariance is reported with its flat index.
    fn validate_covariance_nan_reports_flat_index() {
        let cov = array![[1.0, 0.0], [f64::NAN, 1.0]];
        match validate_covariance(&cov, 2, 1e-10) {
            Err(DensityError::NonFiniteInput { what, index, value }) => {
                assert_eq!(what, "covariance");
                assert_eq!(index, 2);
                assert!(value.is_nan());
            }
            other => panic!("expected NonFiniteInput, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Asymmetry beyond the tolerance is rejected, tiny asymmetry is not.
    //
    // Given
    // -----
    // - One matrix with off-diagonals 0.5 / 0.4.
    // - One matrix with off-diagonals 0.5 / 0.5 + 1e-14.
    //
    // Expect
    // ------
    // - `NotSymmetric { row: 0, col: 1, .. }` for the first.
    // - `Ok(())` for the second.
    fn validate_covariance_symmetry_respects_tolerance() {
        // Arrange
        let skewed = array![[2.0, 0.5], [0.4, 1.0]];
        let nearly = array![[2.0, 0.5], [0.5 + 1e-14, 1.0]];

        // Act / Assert
        match validate_covariance(&skewed, 2, 1e-10) {
            Err(DensityError::NotSymmetric { row, col, diff }) => {
                assert_eq!((row, col), (0, 1));
                assert!((diff - 0.1).abs() < 1e-12);
            }
            other => panic!("expected NotSymmetric, got {other:?}"),
        }
        assert!(validate_covariance(&nearly, 2, 1e-10).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Points are checked for length before finiteness.
    fn validate_point_checks_length_then_values() {
        let short = array![f64::NAN];
        let bad = array![0.0, f64::NEG_INFINITY];

        assert_eq!(
            validate_point(short.view(), 2),
            Err(DensityError::DimensionMismatch { what: "point", expected: 2, found: 1 })
        );
        match validate_point(bad.view(), 2) {
            Err(DensityError::NonFiniteInput { what: "point", index: 1, .. }) => (),
            other => panic!("expected NonFiniteInput, got {other:?}"),
        }
        assert!(validate_point(array![1.0, 2.0].view(), 2).is_ok());
    }
}
