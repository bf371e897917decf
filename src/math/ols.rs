//! Ordinary least squares.
//!
//! Trend segments are straight lines `y = slope * x + intercept`, so each fit is
//! a two-column least squares problem with design rows `[1, x_i]`.
//!
//! We solve it through SVD rather than the closed-form normal equations: the
//! cost is negligible at these sizes and a constant-x input is reported as
//! unsolvable instead of dividing by zero.

use nalgebra::{DMatrix, DVector};

/// Parameters of a fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. 1.0 when the data has no variance.
    pub r_squared: f64,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `ys` against `xs` with an intercept.
///
/// Returns `None` for fewer than two points, mismatched lengths, or when all
/// `xs` coincide.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }
    if xs.iter().all(|&x| (x - xs[0]).abs() < f64::EPSILON) {
        return None;
    }

    let design = DMatrix::from_fn(n, 2, |row, col| if col == 0 { 1.0 } else { xs[row] });
    let target = DVector::from_column_slice(ys);
    let beta = solve_least_squares(&design, &target)?;

    let intercept = beta[0];
    let slope = beta[1];

    let mean = ys.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Some(LineFit {
        slope,
        intercept,
        r_squared,
    })
}
