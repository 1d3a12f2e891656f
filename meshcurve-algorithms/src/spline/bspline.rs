//! Uniform B-splines.
//!
//! Two knot layouts are supported. Open splines use a clamped uniform knot
//! vector so the curve starts and ends at the first and last control values.
//! Periodic splines wrap the control polygon and are always cubic.

use super::SplineValue;

/// Below this a knot difference is treated as zero in de Boor's recurrence.
const KNOT_EPSILON: f64 = 1e-15;

/// A B-spline with integer-spaced knots.
#[derive(Debug, Clone)]
pub struct UniformBSpline<T> {
    control: Vec<T>,
    knots: Vec<f64>,
    degree: usize,
    /// Number of caller-supplied control values
    num_source: usize,
    periodic: bool,
}

impl<T: SplineValue> UniformBSpline<T> {
    /// Create a clamped spline of degree `min(degree, n - 1)`.
    ///
    /// Knots are `0` repeated `degree + 1` times, then `1, 2, ...`, then
    /// `n - degree` repeated `degree + 1` times. Returns `None` without
    /// control values.
    pub fn open(control: Vec<T>, degree: usize) -> Option<Self> {
        let n = control.len();
        if n == 0 {
            return None;
        }
        let p = degree.min(n - 1);
        let end = (n - p) as f64;

        let mut knots = Vec::with_capacity(n + p + 1);
        knots.extend(std::iter::repeat(0.0).take(p + 1));
        knots.extend((1..n - p).map(|i| i as f64));
        knots.extend(std::iter::repeat(end).take(p + 1));

        Some(Self {
            control,
            knots,
            degree: p,
            num_source: n,
            periodic: false,
        })
    }

    /// Create a periodic cubic spline over the closed control polygon.
    ///
    /// The parameter range is `[0, n]` and the span `[i, i+1]` is blended
    /// from control values `i-1, i, i+1, i+2` taken modulo `n`. Returns `None`
    /// without control values.
    pub fn periodic(control: Vec<T>) -> Option<Self> {
        let n = control.len();
        if n == 0 {
            return None;
        }
        let p = 3;
        let shift = p / 2;

        let wrapped = (0..n + p)
            .map(|j| control[(j + n - shift % n) % n])
            .collect();
        let knots = (0..n + 2 * p + 1).map(|j| j as f64 - p as f64).collect();

        Some(Self {
            control: wrapped,
            knots,
            degree: p,
            num_source: n,
            periodic: true,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Valid parameter range `[u_min, u_max]`.
    pub fn domain(&self) -> (f64, f64) {
        let p = self.degree;
        (self.knots[p], self.knots[self.control.len()])
    }

    /// Evaluate at parameter `u`, clamped to the domain.
    pub fn evaluate(&self, u: f64) -> T {
        let (u_min, u_max) = self.domain();
        let u = u.clamp(u_min, u_max);
        let span = self.find_span(u);
        self.de_boor(span, u)
    }

    /// Evaluate at fraction `s` of the interval that starts at source control
    /// value `interval`.
    ///
    /// Periodic splines have one interval per control value. Open splines have
    /// `n - 1` intervals spread evenly over the clamped domain.
    pub fn evaluate_interval(&self, interval: usize, s: f64) -> T {
        let t = interval as f64 + s;
        if self.periodic || self.num_source < 2 {
            return self.evaluate(t);
        }
        let (u_min, u_max) = self.domain();
        self.evaluate(u_min + t * (u_max - u_min) / (self.num_source - 1) as f64)
    }

    /// Returns `i` such that `knots[i] <= u < knots[i+1]`, with the end of the
    /// domain folded into the last span.
    fn find_span(&self, u: f64) -> usize {
        let n = self.control.len();
        let p = self.degree;

        if u >= self.knots[n] {
            return n - 1;
        }

        let mut low = p;
        let mut high = n;
        while low < high {
            let mid = (low + high) / 2;
            if self.knots[mid] > u {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        low - 1
    }

    fn de_boor(&self, span: usize, u: f64) -> T {
        let p = self.degree;
        let mut d: Vec<T> = (0..=p).map(|j| self.control[j + span - p]).collect();

        for r in 1..=p {
            for j in (r..=p).rev() {
                let i = j + span - p;
                let denom = self.knots[i + p + 1 - r] - self.knots[i];
                let alpha = if denom.abs() > KNOT_EPSILON {
                    (u - self.knots[i]) / denom
                } else {
                    0.0
                };
                d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
            }
        }

        d[p]
    }
}
