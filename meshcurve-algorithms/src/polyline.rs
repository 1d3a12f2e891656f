//! Parametric queries over a discretized curve
//!
//! A location on a polyline of `n` points is `r = k + s`, where `k` is a point
//! index and `s` in `[0, 1]` the position along the segment from point `k` to
//! point `k + 1`. A closed polyline has an extra segment from `n - 1` back to
//! `0`, reported with `k = n - 1`.

use meshcurve_core::{Point3d, Vector3d};

/// Slack for accepting roots that land a hair outside a segment
const PARAM_TOLERANCE: f64 = 1e-12;

/// Segments scanned by a query, with the lower bound on `s` for each
struct SegmentScan<'a> {
    points: &'a [Point3d],
    next: usize,
    end: usize,
    start_s: f64,
}

impl<'a> SegmentScan<'a> {
    /// Open polylines start at `r0` clamped to `[0, n-1]`; closed ones ignore it
    fn new(points: &'a [Point3d], closed: bool, r0: f64) -> Self {
        let n = points.len();
        if closed {
            return Self {
                points,
                next: 0,
                end: n,
                start_s: 0.0,
            };
        }
        let last = n.saturating_sub(2);
        let r0 = if r0.is_nan() { 0.0 } else { r0.clamp(0.0, (n.max(1) - 1) as f64) };
        let k0 = (r0.floor() as usize).min(last);
        Self {
            points,
            next: k0,
            end: n.saturating_sub(1),
            start_s: (r0 - k0 as f64).clamp(0.0, 1.0),
        }
    }
}

impl Iterator for SegmentScan<'_> {
    /// `(k, a, b, s_min)`
    type Item = (usize, Point3d, Point3d, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let n = self.points.len();
        let k = self.next;
        self.next += 1;
        let s_min = std::mem::replace(&mut self.start_s, 0.0);
        Some((k, self.points[k], self.points[(k + 1) % n], s_min))
    }
}

/// Find the first location at or after the search start whose straight-line
/// distance from `p0` equals `dist`.
///
/// Returns `None` for fewer than two points, a negative distance, or when no
/// point of the scanned polyline is at that distance.
pub fn find_point_at_distance(
    points: &[Point3d],
    closed: bool,
    p0: &Point3d,
    dist: f64,
    r0: f64,
) -> Option<(f64, Point3d)> {
    if points.len() < 2 || dist < 0.0 {
        return None;
    }
    let dist_sq = dist * dist;

    for (k, a, b, s_min) in SegmentScan::new(points, closed, r0) {
        let d = b - a;
        let w = a - p0;
        let qa = d.norm_squared();
        if qa == 0.0 {
            if (w.norm_squared() - dist_sq).abs() <= PARAM_TOLERANCE * dist_sq.max(1.0) {
                return Some((k as f64 + s_min, a));
            }
            continue;
        }
        let qb = 2.0 * w.dot(&d);
        let qc = w.norm_squared() - dist_sq;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            continue;
        }
        let root = disc.sqrt();
        let lo = (-qb - root) / (2.0 * qa);
        let hi = (-qb + root) / (2.0 * qa);
        let found = [lo, hi]
            .into_iter()
            .find(|s| *s >= s_min - PARAM_TOLERANCE && *s <= 1.0 + PARAM_TOLERANCE);
        if let Some(s) = found {
            let s = s.clamp(s_min, 1.0);
            return Some((k as f64 + s, a + d * s));
        }
    }
    None
}

/// Find the closest location to `p0` at or after the search start.
///
/// On ties the earliest location wins. An empty polyline yields `(0, origin)`
/// and a single point yields `(0, point)`.
pub fn find_nearest_point(points: &[Point3d], closed: bool, p0: &Point3d, r0: f64) -> (f64, Point3d) {
    match points {
        [] => return (0.0, Point3d::origin()),
        [only] => return (0.0, *only),
        _ => {}
    }

    let mut best = (0.0, points[0], f64::INFINITY);
    for (k, a, b, s_min) in SegmentScan::new(points, closed, r0) {
        let d = b - a;
        let len_sq = d.norm_squared();
        let s = if len_sq > 0.0 {
            ((p0 - a).dot(&d) / len_sq).clamp(s_min, 1.0)
        } else {
            s_min
        };
        let candidate = a + d * s;
        let dist_sq = (candidate - p0).norm_squared();
        if dist_sq < best.2 {
            best = (k as f64 + s, candidate, dist_sq);
        }
    }
    (best.0, best.1)
}

/// Finite-difference tangent at point `idx`
///
/// Interior points use the central difference, open ends the one-sided
/// difference to their only neighbour. Closed polylines wrap when they have
/// more than two points. Fewer than two points, or an index out of range,
/// give the zero vector. The result is not normalized.
pub fn tangent(points: &[Point3d], closed: bool, idx: usize) -> Vector3d {
    let n = points.len();
    if n < 2 || idx >= n {
        return Vector3d::zeros();
    }
    if closed && n > 2 {
        let prev = points[(idx + n - 1) % n];
        let next = points[(idx + 1) % n];
        return (next - prev) / 2.0;
    }
    if idx == 0 {
        points[1] - points[0]
    } else if idx == n - 1 {
        points[n - 1] - points[n - 2]
    } else {
        (points[idx + 1] - points[idx - 1]) / 2.0
    }
}
