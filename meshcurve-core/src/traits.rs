//! Core traits for meshcurve

use crate::{mesh::TriangleMesh, point::*, transform::Transform3D};

/// Trait for nearest neighbor search functionality
pub trait NearestNeighborSearch {
    /// Find the nearest neighbor to a query point
    fn find_nearest(&self, query: &Point3d) -> Option<(usize, f64)>;
    
    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<(usize, f64)>;
}

/// Trait for objects with spatial extent
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3d, Point3d);
    
    /// Get the center point of the object
    fn center(&self) -> Point3d {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }

    /// Half the diagonal of the bounding box
    fn radius(&self) -> f64 {
        let (min, max) = self.bounding_box();
        0.5 * (max - min).norm()
    }
}

/// Capabilities a host surface must offer to carry curves
///
/// All points, directions and normals crossing this interface are in world
/// coordinates. Faces are addressed by index; an index that is out of range
/// for the current mesh is answered with `None` rather than a panic, since
/// markers may outlive topology edits made elsewhere.
pub trait SurfaceMesh {
    /// Whether every face of the mesh is a triangle
    fn is_triangular(&self) -> bool {
        true
    }

    /// Number of faces
    fn num_faces(&self) -> usize;

    /// World positions of the three corners of a face
    fn face_world_vertices(&self, face: usize) -> Option<[Point3d; 3]>;

    /// Nearest face to a point, with the nearest point on it
    fn nearest_face_to_point(&self, point: &Point3d) -> Option<FaceHit>;

    /// Face intersected by the line `origin + t * direction` with the smallest
    /// `|t|` inside `[t_min, t_max]`; infinite bounds search the whole line
    fn nearest_face_along_line(
        &self,
        origin: &Point3d,
        direction: &Vector3d,
        t_min: f64,
        t_max: f64,
    ) -> Option<FaceHit>;

    /// Gaussian-weighted surface normal at a point on `face`
    fn estimate_surface_normal(&self, point: &Point3d, face: usize, radius: f64) -> Vector3d;

    /// Current mesh-to-world transform
    fn mesh_to_world(&self) -> Transform3D;

    /// Half the diagonal of the world-space bounding box
    fn radius(&self) -> f64;
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        bounding_box_of(&self.vertices)
    }
}

/// Axis-aligned bounds of a set of points; the origin for an empty set
pub fn bounding_box_of<'a, I>(points: I) -> (Point3d, Point3d)
where
    I: IntoIterator<Item = &'a Point3d>,
{
    let mut iter = points.into_iter();
    let first = match iter.next() {
        Some(p) => *p,
        None => return (Point3d::origin(), Point3d::origin()),
    };
    iter.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)))
}
