//! Spline bases used to interpolate marker sequences
//!
//! Both bases are generic over the interpolated value so the same machinery
//! drives marker positions and marker normals.

pub mod bspline;
pub mod natural;

pub use bspline::UniformBSpline;
pub use natural::NaturalCubicSpline;

use std::ops::{Add, Div, Mul, Sub};

/// Values that can be blended linearly by a spline basis
pub trait SplineValue:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> + Div<f64, Output = Self>
{
}

impl<T> SplineValue for T where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T> + Div<f64, Output = T>
{
}

/// Solve a tridiagonal system with the Thomas algorithm
///
/// `lower[0]` and `upper[m-1]` are ignored. The system must be diagonally
/// dominant; the solver does no pivoting.
pub(crate) fn solve_tridiagonal<T: SplineValue>(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[T],
) -> Vec<T> {
    let m = rhs.len();
    if m == 0 {
        return Vec::new();
    }

    let mut c_prime = vec![0.0; m];
    let mut d_prime = Vec::with_capacity(m);
    c_prime[0] = upper[0] / diag[0];
    d_prime.push(rhs[0] / diag[0]);
    for i in 1..m {
        let w = diag[i] - lower[i] * c_prime[i - 1];
        c_prime[i] = upper[i] / w;
        let d = (rhs[i] - d_prime[i - 1] * lower[i]) / w;
        d_prime.push(d);
    }

    let mut x = d_prime;
    for i in (0..m - 1).rev() {
        x[i] = x[i] - x[i + 1] * c_prime[i];
    }
    x
}
