//! Sample moments and ordinary least squares
//!
//! Plain functions over slices; the estimators compose these instead of
//! reaching for any shared statistics state.

use nalgebra::{DMatrix, DVector};
use statrs::statistics::Statistics;

use crate::error::{EsgError, EsgResult};

/// Relative pivot size below which the normal equations are treated as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean (NaN for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Sample standard deviation with the n-1 denominator (NaN below two values)
pub fn sample_std_dev(values: &[f64]) -> f64 {
    values.iter().std_dev()
}

/// Mean of squared values
pub fn mean_square(values: &[f64]) -> f64 {
    values.iter().map(|x| x * x).mean()
}

/// Result of a least-squares fit
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Intercept first (when fitted), then one coefficient per regressor
    pub coefficients: Vec<f64>,
    /// `y - X beta`, one per observation
    pub residuals: Vec<f64>,
}

impl OlsFit {
    /// Mean squared residual (divides by n, not n - k)
    pub fn residual_mean_square(&self) -> f64 {
        mean_square(&self.residuals)
    }
}

/// Ordinary least squares of `response` on the given regressor columns
///
/// Solves the normal equations `X'X beta = X'y` by LU decomposition. Fails
/// with `InvalidInput` for mismatched lengths, too few observations or a
/// rank-deficient design (e.g. a constant regressor alongside an intercept).
pub fn ols(regressors: &[&[f64]], response: &[f64], intercept: bool) -> EsgResult<OlsFit> {
    let n = response.len();
    let k = regressors.len() + usize::from(intercept);
    if k == 0 {
        return Err(EsgError::invalid("regressors", "no regressors and no intercept"));
    }
    if let Some(col) = regressors.iter().find(|c| c.len() != n) {
        return Err(EsgError::invalid(
            "regressors",
            format!("column of length {} for {} observations", col.len(), n),
        ));
    }
    if n < k {
        return Err(EsgError::invalid(
            "response",
            format!("{} observations for {} coefficients", n, k),
        ));
    }

    let offset = usize::from(intercept);
    let design = DMatrix::from_fn(n, k, |i, j| {
        if j < offset {
            1.0
        } else {
            regressors[j - offset][i]
        }
    });
    let y = DVector::from_column_slice(response);

    let design_t = design.transpose();
    let normal = &design_t * &design;
    let rhs = &design_t * &y;

    let beta = solve_normal_equations(normal, &rhs)?;
    let residuals = &y - &design * &beta;

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        residuals: residuals.iter().copied().collect(),
    })
}

fn solve_normal_equations(normal: DMatrix<f64>, rhs: &DVector<f64>) -> EsgResult<DVector<f64>> {
    let scale = normal.diagonal().amax();
    if scale == 0.0 || !scale.is_finite() {
        return Err(EsgError::invalid("regressors", "design matrix is zero or non-finite"));
    }

    let singular = || EsgError::invalid("regressors", "design matrix is singular (degenerate or constant series)");
    let lu = normal.lu();
    if lu.u().diagonal().iter().any(|p| p.abs() <= SINGULAR_TOLERANCE * scale) {
        return Err(singular());
    }
    lu.solve(rhs).ok_or_else(singular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moments() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(mean(&x), 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(sample_std_dev(&x), (5.0f64 / 3.0).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(mean_square(&x), 7.5, epsilon = 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(sample_std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn test_exact_line_with_intercept() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 + 2.0 * v).collect();
        let fit = ols(&[&x], &y, true).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-12);
        assert!(fit.residual_mean_square() < 1e-24);
    }

    #[test]
    fn test_two_regressors_no_intercept() {
        let x1 = [1.0, 0.0, 1.0, 2.0, 3.0];
        let x2 = [0.0, 1.0, 1.0, 1.0, -1.0];
        let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 3.0 * a - 1.5 * b).collect();
        let fit = ols(&[&x1, &x2], &y, false).unwrap();
        assert_eq!(fit.coefficients.len(), 2);
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.coefficients[1], -1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_residuals_orthogonal_to_regressors() {
        let x = [0.1, 0.4, 0.2, 0.9, 0.5, 0.3];
        let y = [1.0, 2.1, 1.2, 3.9, 2.4, 1.9];
        let fit = ols(&[&x], &y, true).unwrap();
        let dot: f64 = fit.residuals.iter().zip(&x).map(|(e, x)| e * x).sum();
        let sum: f64 = fit.residuals.iter().sum();
        assert_abs_diff_eq!(dot, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sum, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_regressor_is_singular() {
        let x = [0.02; 6];
        let y = [0.02; 6];
        let err = ols(&[&x], &y, true).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_length_mismatch() {
        let x = [1.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        assert!(ols(&[&x], &y, true).is_err());
    }
}
