//! Triangle-level geometric primitives
//!
//! Closest-point and line-intersection routines used by the mesh queries.
//! Barycentric results are reported as `(s1, s2)`, the weights of the second
//! and third triangle corners.

use meshcurve_core::{Point3d, Vector3d};

/// Tolerance on barycentric coordinates when accepting a line hit, so that
/// lines through shared edges are not lost to rounding
const EDGE_TOLERANCE: f64 = 1e-12;

/// Compute the closest point on a triangle to a query point.
///
/// This implements the region classification from "Real-Time Collision
/// Detection" by Christer Ericson, additionally tracking the barycentric
/// coordinates of the result.
#[allow(clippy::many_single_char_names)]
pub fn closest_point_on_triangle(
    p: &Point3d,
    a: &Point3d,
    b: &Point3d,
    c: &Point3d,
) -> (Point3d, (f64, f64)) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*a, (0.0, 0.0));
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, (1.0, 0.0));
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, (v, 0.0));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, (0.0, 1.0));
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, (0.0, w));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, (1.0 - w, w));
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, (v, w))
}

/// Intersect the infinite line `origin + t * dir` with a triangle.
///
/// Uses the Möller–Trumbore algorithm without restricting the sign of `t`.
/// Returns `(t, s1, s2)` or `None` when the line misses or runs parallel to
/// the triangle's plane.
pub fn line_triangle_intersect(
    origin: &Point3d,
    dir: &Vector3d,
    a: &Point3d,
    b: &Point3d,
    c: &Point3d,
) -> Option<(f64, f64, f64)> {
    let edge1 = b - a;
    let edge2 = c - a;

    let h = dir.cross(&edge2);
    let det = edge1.dot(&h);

    // Scale the parallel test by the edge lengths so tiny triangles still register
    let scale = dir.norm() * edge1.norm() * edge2.norm();
    if scale == 0.0 || det.abs() <= 1e-14 * scale {
        return None;
    }

    let f = 1.0 / det;
    let s = origin - a;
    let u = f * s.dot(&h);
    if u < -EDGE_TOLERANCE || u > 1.0 + EDGE_TOLERANCE {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < -EDGE_TOLERANCE || u + v > 1.0 + EDGE_TOLERANCE {
        return None;
    }

    let t = f * edge2.dot(&q);
    Some((t, u, v))
}
