//! Projection of sampled points onto a surface

use meshcurve_core::{FaceHit, Point3d, SurfaceMesh, Vector3d};
use tracing::debug;

/// Projects points onto a mesh along a direction, falling back to the
/// nearest face when the line misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceProjector;

impl SurfaceProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project `point` onto `mesh` along the unbounded line through it with
    /// direction `direction`.
    ///
    /// The crossing with the smallest absolute line parameter wins. A zero
    /// direction, or a line that crosses no face, uses the closest point on
    /// the mesh instead. Returns `None` only when the mesh has no faces.
    pub fn project<M>(&self, mesh: &M, point: &Point3d, direction: &Vector3d) -> Option<FaceHit>
    where
        M: SurfaceMesh + ?Sized,
    {
        if direction.norm_squared() > 0.0 {
            if let Some(hit) =
                mesh.nearest_face_along_line(point, direction, f64::NEG_INFINITY, f64::INFINITY)
            {
                return Some(hit);
            }
        }
        debug!(?point, "line projection missed the surface, using nearest face");
        mesh.nearest_face_to_point(point)
    }
}
