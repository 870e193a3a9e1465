//! Ordinary least squares.
//!
//! Trend lines are fitted as:
//!
//! ```text
//! minimize Σ (y_i - (a + b·x_i))^2,   x_i = 0, 1, 2, ...
//! ```
//!
//! i.e. against the positional index of chronologically sorted periods, not
//! calendar-weighted time.
//!
//! The solve goes through SVD so that a degenerate design matrix produces
//! `None` rather than a panic.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Straight line fitted over the index sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
    /// Fitted value at each index.
    pub fitted: Vec<f64>,
}

/// Fit `y = intercept + slope·i` for `i = 0..values.len()`.
///
/// Needs at least two points.
pub fn fit_line_over_index(values: &[f64]) -> Option<LineFit> {
    let n = values.len();
    if n < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let x = DMatrix::from_fn(n, 2, |row, col| if col == 0 { 1.0 } else { row as f64 });
    let y = DVector::from_column_slice(values);
    let beta = solve_least_squares(&x, &y)?;

    let intercept = beta[0];
    let slope = beta[1];
    let fitted = (0..n).map(|i| intercept + slope * i as f64).collect();

    Some(LineFit {
        intercept,
        slope,
        fitted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn line_over_index_matches_closed_form() {
        // Closed form for [1, 3, 2, 6]: slope = 1.4, intercept = 0.9.
        let fit = fit_line_over_index(&[1.0, 3.0, 2.0, 6.0]).unwrap();
        assert!((fit.slope - 1.4).abs() < 1e-9);
        assert!((fit.intercept - 0.9).abs() < 1e-9);
        assert_eq!(fit.fitted.len(), 4);
        assert!((fit.fitted[3] - 5.1).abs() < 1e-9);
    }

    #[test]
    fn line_needs_two_points() {
        assert!(fit_line_over_index(&[]).is_none());
        assert!(fit_line_over_index(&[5.0]).is_none());
    }
}
