//! Interpolating cubic splines.
//!
//! The spline is stored as its knot values plus the second derivative `M_i` at
//! every knot. On `[x_j, x_{j+1}]` with `h = x_{j+1} - x_j`:
//!
//! ```text
//! S(x) = M_j (x_{j+1} - x)^3 / 6h + M_{j+1} (x - x_j)^3 / 6h
//!      + (y_j / h - M_j h / 6)(x_{j+1} - x) + (y_{j+1} / h - M_{j+1} h / 6)(x - x_j)
//! ```
//!
//! End conditions are "not-a-knot": the third derivative is continuous across
//! the second and the second-to-last knot. With exactly four knots the spline is
//! the interpolating cubic, and any cubic polynomial is reproduced exactly.

use nalgebra::{DMatrix, DVector};

/// Fewest knots a not-a-knot cubic spline can be built from.
pub const MIN_SPLINE_KNOTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivs: Vec<f64>,
}

impl CubicSpline {
    /// Build a spline through `(xs[i], ys[i])`.
    ///
    /// Returns `None` for fewer than four knots, mismatched lengths,
    /// non-increasing `xs`, or a singular system.
    pub fn not_a_knot(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < MIN_SPLINE_KNOTS || ys.len() != n {
            return None;
        }
        if xs.windows(2).any(|w| !(w[1] > w[0])) {
            return None;
        }

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        a[(0, 0)] = h[1];
        a[(0, 1)] = -(h[0] + h[1]);
        a[(0, 2)] = h[0];

        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }

        a[(n - 1, n - 3)] = h[n - 2];
        a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
        a[(n - 1, n - 1)] = h[n - 3];

        let m = a.lu().solve(&rhs)?;
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second_derivs: m.iter().copied().collect(),
        })
    }

    /// Evaluate the spline. Outside the knot range the end pieces are extended.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let j = self.xs.partition_point(|&k| k <= x).saturating_sub(1).min(n - 2);

        let (x0, x1) = (self.xs[j], self.xs[j + 1]);
        let (y0, y1) = (self.ys[j], self.ys[j + 1]);
        let (m0, m1) = (self.second_derivs[j], self.second_derivs[j + 1]);
        let h = x1 - x0;
        let (l, r) = (x1 - x, x - x0);

        m0 * l.powi(3) / (6.0 * h) + m1 * r.powi(3) / (6.0 * h) + (y0 / h - m0 * h / 6.0) * l + (y1 / h - m1 * h / 6.0) * r
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
