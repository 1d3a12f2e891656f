//! Surface normal estimation
//!
//! Normals at arbitrary surface points are estimated by blending the normal of
//! the containing face with the normals of nearby vertices. Vertex
//! contributions fall off with a Gaussian whose standard deviation is half the
//! search radius, so the radius spans two standard deviations.

use meshcurve_core::{NearestNeighborSearch, Point3d, TriangleMesh, Vector3d};

/// Gaussian weight of a vertex at `dist` for a search `radius`
pub fn gaussian_weight(dist: f64, radius: f64) -> f64 {
    let sigma = radius / 2.0;
    (-(dist * dist) / (2.0 * sigma * sigma)).exp()
}

/// Estimate the unit surface normal at `point` on `face`
///
/// With `radius == 0` the flat face normal is returned. Otherwise the face
/// normal (weight 1) is averaged with every vertex normal within `radius` of
/// `point`, weighted by [`gaussian_weight`], and renormalized. All inputs are
/// in the mesh-local frame. A degenerate neighborhood falls back to +Z.
pub fn estimate_surface_normal<S>(
    mesh: &TriangleMesh,
    vertex_normals: &[Vector3d],
    vertices: &S,
    point: &Point3d,
    face: usize,
    radius: f64,
) -> Vector3d
where
    S: NearestNeighborSearch + ?Sized,
{
    let face_normal = mesh.face_normal(face);
    if radius <= 0.0 {
        return face_normal
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3d::z);
    }

    let blended = vertices
        .find_radius_neighbors(point, radius)
        .into_iter()
        .filter_map(|(v, dist)| vertex_normals.get(v).map(|n| n * gaussian_weight(dist, radius)))
        .fold(face_normal, |acc, n| acc + n);

    blended
        .try_normalize(f64::EPSILON)
        .or_else(|| face_normal.try_normalize(f64::EPSILON))
        .unwrap_or_else(Vector3d::z)
}
