//! Indexed host mesh
//!
//! [`MeshSurface`] owns a triangle mesh in its local frame together with the
//! spatial indexes and the mesh-to-world transform, and implements the
//! [`SurfaceMesh`] capabilities that curves and markers consume.

use crate::normals;
use crate::spatial::{FaceIndex, VertexIndex};
use meshcurve_core::{
    bounding_box_of, Error, FaceHit, Point3d, Result, SurfaceMesh, Transform3D, TriangleMesh,
    Vector3d,
};

/// A triangle mesh prepared for surface queries
pub struct MeshSurface {
    mesh: TriangleMesh,
    vertex_normals: Vec<Vector3d>,
    vertex_index: VertexIndex,
    face_index: FaceIndex,
    mesh_to_world: Transform3D,
    world_to_mesh: Transform3D,
}

impl MeshSurface {
    /// Build indexes for `mesh` with an identity mesh-to-world transform
    ///
    /// Vertex normals are taken from the mesh when present, otherwise they are
    /// computed with area weighting.
    pub fn new(mesh: TriangleMesh) -> Result<Self> {
        mesh.validate()?;
        let vertex_normals = match &mesh.normals {
            Some(normals) => normals
                .iter()
                .map(|n| n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3d::zeros))
                .collect(),
            None => mesh.calculate_vertex_normals(),
        };
        let vertex_index = VertexIndex::new(&mesh.vertices);
        let face_index = FaceIndex::new(&mesh);
        Ok(Self {
            mesh,
            vertex_normals,
            vertex_index,
            face_index,
            mesh_to_world: Transform3D::identity(),
            world_to_mesh: Transform3D::identity(),
        })
    }

    /// Build indexes and place the mesh with `mesh_to_world`
    pub fn with_transform(mesh: TriangleMesh, mesh_to_world: Transform3D) -> Result<Self> {
        let mut surface = Self::new(mesh)?;
        surface.set_mesh_to_world(mesh_to_world)?;
        Ok(surface)
    }

    /// The underlying mesh in its local frame
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Per-vertex unit normals in the local frame
    pub fn vertex_normals(&self) -> &[Vector3d] {
        &self.vertex_normals
    }

    /// Move the mesh rigidly (or affinely) without touching its geometry
    ///
    /// Curves cache their samples in the mesh-local frame, so they stay valid
    /// across this call. Marker world positions do not: refresh them with the
    /// curve's `update_marker_positions`.
    pub fn set_mesh_to_world(&mut self, mesh_to_world: Transform3D) -> Result<()> {
        let world_to_mesh = mesh_to_world
            .inverse()
            .ok_or_else(|| Error::InvalidData("mesh-to-world transform is singular".to_string()))?;
        self.mesh_to_world = mesh_to_world;
        self.world_to_mesh = world_to_mesh;
        Ok(())
    }

    /// Replace the local vertex positions and rebuild the indexes
    ///
    /// The face list is kept. Existing normals are recomputed from the new
    /// geometry. Curves on this surface must be invalidated by the caller.
    pub fn set_vertices(&mut self, vertices: Vec<Point3d>) -> Result<()> {
        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, std::mem::take(&mut self.mesh.faces));
        if let Err(err) = mesh.validate() {
            self.mesh.faces = mesh.faces;
            return Err(err);
        }
        mesh.normals = None;
        self.vertex_normals = mesh.calculate_vertex_normals();
        self.vertex_index = VertexIndex::new(&mesh.vertices);
        self.face_index = FaceIndex::new(&mesh);
        self.mesh = mesh;
        Ok(())
    }

    fn to_local(&self, point: &Point3d) -> Point3d {
        self.world_to_mesh.transform_point(point)
    }

    fn to_world(&self, hit: FaceHit) -> FaceHit {
        FaceHit {
            point: self.mesh_to_world.transform_point(&hit.point),
            ..hit
        }
    }
}

impl SurfaceMesh for MeshSurface {
    fn num_faces(&self) -> usize {
        self.mesh.face_count()
    }

    fn face_world_vertices(&self, face: usize) -> Option<[Point3d; 3]> {
        self.mesh
            .face_vertices(face)
            .map(|corners| corners.map(|p| self.mesh_to_world.transform_point(&p)))
    }

    fn nearest_face_to_point(&self, point: &Point3d) -> Option<FaceHit> {
        self.face_index
            .nearest_face(&self.to_local(point))
            .map(|hit| self.to_world(hit))
    }

    fn nearest_face_along_line(
        &self,
        origin: &Point3d,
        direction: &Vector3d,
        t_min: f64,
        t_max: f64,
    ) -> Option<FaceHit> {
        let local_dir = self.world_to_mesh.transform_vector(direction);
        self.face_index
            .nearest_face_along_line(&self.to_local(origin), &local_dir, t_min, t_max)
            .map(|hit| self.to_world(hit))
    }

    fn estimate_surface_normal(&self, point: &Point3d, face: usize, radius: f64) -> Vector3d {
        let local = normals::estimate_surface_normal(
            &self.mesh,
            &self.vertex_normals,
            &self.vertex_index,
            &self.to_local(point),
            face,
            radius,
        );
        self.mesh_to_world.transform_normal(&local)
    }

    fn mesh_to_world(&self) -> Transform3D {
        self.mesh_to_world
    }

    fn radius(&self) -> f64 {
        let world: Vec<Point3d> = self
            .mesh
            .vertices
            .iter()
            .map(|p| self.mesh_to_world.transform_point(p))
            .collect();
        let (min, max) = bounding_box_of(&world);
        0.5 * (max - min).norm()
    }
}
