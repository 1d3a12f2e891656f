//! Natural cubic splines with unit knot spacing.

use super::{solve_tridiagonal, SplineValue};

/// Interpolating cubic spline through a sequence of values at knots
/// `0, 1, ..., n-1` (or `0..n` when closed).
///
/// Open splines have zero second derivative at both ends. Closed splines wrap
/// so the last value connects smoothly back to the first.
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline<T> {
    values: Vec<T>,
    second_derivatives: Vec<T>,
    closed: bool,
}

impl<T: SplineValue> NaturalCubicSpline<T> {
    /// Fit the spline. Returns `None` without values.
    pub fn new(values: Vec<T>, closed: bool) -> Option<Self> {
        let first = *values.first()?;
        let zero = first * 0.0;
        let second_derivatives = if closed {
            periodic_second_derivatives(&values, zero)
        } else {
            natural_second_derivatives(&values, zero)
        };
        Some(Self {
            values,
            second_derivatives,
            closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn second_derivatives(&self) -> &[T] {
        &self.second_derivatives
    }

    /// Evaluate at fraction `s` of the interval from knot `interval` to the
    /// next one.
    pub fn evaluate_interval(&self, interval: usize, s: f64) -> T {
        let n = self.values.len();
        if n == 1 {
            return self.values[0];
        }
        let (i, j) = if self.closed {
            let i = interval % n;
            (i, (i + 1) % n)
        } else {
            let i = interval.min(n - 2);
            (i, i + 1)
        };

        let t = 1.0 - s;
        let linear = self.values[i] * t + self.values[j] * s;
        let curvature = self.second_derivatives[i] * (t * t * t - t)
            + self.second_derivatives[j] * (s * s * s - s);
        linear + curvature / 6.0
    }
}

/// Right-hand side `6 (P[i+1] - 2 P[i] + P[i-1])` of the unit-spacing system
fn curvature_rhs<T: SplineValue>(prev: T, cur: T, next: T) -> T {
    (next - cur * 2.0 + prev) * 6.0
}

fn natural_second_derivatives<T: SplineValue>(values: &[T], zero: T) -> Vec<T> {
    let n = values.len();
    if n <= 2 {
        return vec![zero; n];
    }

    let m = n - 2;
    let rhs: Vec<T> = (1..n - 1)
        .map(|i| curvature_rhs(values[i - 1], values[i], values[i + 1]))
        .collect();
    let interior = solve_tridiagonal(&vec![1.0; m], &vec![4.0; m], &vec![1.0; m], &rhs);

    let mut result = Vec::with_capacity(n);
    result.push(zero);
    result.extend(interior);
    result.push(zero);
    result
}

fn periodic_second_derivatives<T: SplineValue>(values: &[T], zero: T) -> Vec<T> {
    let n = values.len();
    let rhs: Vec<T> = (0..n)
        .map(|i| curvature_rhs(values[(i + n - 1) % n], values[i], values[(i + 1) % n]))
        .collect();

    match n {
        0 | 1 => vec![zero; n],
        2 => {
            // Both neighbours coincide: [4 2; 2 4] M = rhs
            vec![
                (rhs[0] * 4.0 - rhs[1] * 2.0) / 12.0,
                (rhs[1] * 4.0 - rhs[0] * 2.0) / 12.0,
            ]
        }
        _ => solve_cyclic(n, &rhs),
    }
}

/// Solve the cyclic system `M[i-1] + 4 M[i] + M[i+1] = rhs[i]` (indices
/// modulo `n`, `n >= 3`) with the Sherman-Morrison correction.
fn solve_cyclic<T: SplineValue>(n: usize, rhs: &[T]) -> Vec<T> {
    let lower = vec![1.0; n];
    let upper = vec![1.0; n];
    let corner_low = 1.0;
    let corner_high = 1.0;

    let gamma = -4.0;
    let mut diag = vec![4.0; n];
    diag[0] -= gamma;
    diag[n - 1] -= corner_low * corner_high / gamma;

    let x = solve_tridiagonal(&lower, &diag, &upper, rhs);

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = corner_low;
    let z = solve_tridiagonal(&lower, &diag, &upper, &u);

    let denom = 1.0 + z[0] + corner_high * z[n - 1] / gamma;
    let fact = (x[0] + x[n - 1] * (corner_high / gamma)) / denom;
    x.into_iter().zip(z).map(|(xi, zi)| xi - fact * zi).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_empty_has_no_spline() {
        assert!(NaturalCubicSpline::<f64>::new(Vec::new(), false).is_none());
    }

    #[test]
    fn test_interpolates_knots() {
        let values = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 0.0),
            Vector3::new(3.0, 2.0, 1.0),
            Vector3::new(4.0, 0.0, 0.0),
        ];
        for closed in [false, true] {
            let spline = NaturalCubicSpline::new(values.clone(), closed).unwrap();
            for i in 0..3 {
                assert_relative_eq!(spline.evaluate_interval(i, 0.0), values[i], epsilon = 1e-12);
                assert_relative_eq!(spline.evaluate_interval(i, 1.0), values[i + 1], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_open_three_values() {
        let spline = NaturalCubicSpline::new(vec![0.0, 1.0, 0.0], false).unwrap();
        let m = spline.second_derivatives();
        assert_relative_eq!(m[0], 0.0);
        assert_relative_eq!(m[1], -3.0, epsilon = 1e-12);
        assert_relative_eq!(m[2], 0.0);
        assert_relative_eq!(spline.evaluate_interval(0, 0.5), 0.6875, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_values_stay_linear() {
        let spline = NaturalCubicSpline::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], false).unwrap();
        for m in spline.second_derivatives() {
            assert_relative_eq!(*m, 0.0, epsilon = 1e-12);
        }
        assert_relative_eq!(spline.evaluate_interval(2, 0.3), 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_two_values_open_is_linear() {
        let spline = NaturalCubicSpline::new(vec![1.0, 3.0], false).unwrap();
        assert_relative_eq!(spline.evaluate_interval(0, 0.5), 2.0);
        // Intervals past the end reuse the last segment
        assert_relative_eq!(spline.evaluate_interval(4, 1.0), 3.0);
    }

    #[test]
    fn test_closed_second_derivatives() {
        let spline = NaturalCubicSpline::new(vec![0.0, 1.0, 0.0, -1.0], true).unwrap();
        assert!(spline.is_closed());
        let m = spline.second_derivatives();
        let expected = [0.0, -3.0, 0.0, 3.0];
        for (got, want) in m.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        // Wrap interval returns to the first value
        assert_relative_eq!(spline.evaluate_interval(3, 1.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_two_values() {
        let spline = NaturalCubicSpline::new(vec![0.0, 1.0], true).unwrap();
        let m = spline.second_derivatives();
        assert_relative_eq!(m[0], 6.0, epsilon = 1e-12);
        assert_relative_eq!(m[1], -6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_first_derivative_is_continuous_at_wrap() {
        let values = vec![2.0, 5.0, -1.0, 3.0, 0.5];
        let spline = NaturalCubicSpline::new(values, true).unwrap();
        let h = 1e-6;
        let before = (spline.evaluate_interval(4, 1.0) - spline.evaluate_interval(4, 1.0 - h)) / h;
        let after = (spline.evaluate_interval(0, h) - spline.evaluate_interval(0, 0.0)) / h;
        assert_relative_eq!(before, after, epsilon = 1e-4);
    }
}
