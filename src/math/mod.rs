//! Numerical building blocks: line fitting and spline interpolation.

pub mod ols;
pub mod spline;

pub use ols::*;
pub use spline::*;
