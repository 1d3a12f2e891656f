//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
///
/// Coordinates are stored in the mesh-local frame. Faces index into
/// `vertices`; a curve marker refers to a face only by its position in
/// `faces`, so storage can be edited without leaving dangling references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3d>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3d) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Check that every face references existing vertices
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        for (i, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v >= n) {
                return Err(Error::InvalidData(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    i, bad, n
                )));
            }
        }
        if let Some(normals) = &self.normals {
            if normals.len() != n {
                return Err(Error::InvalidData(format!(
                    "mesh has {} vertices but {} normals",
                    n,
                    normals.len()
                )));
            }
        }
        Ok(())
    }

    /// The three corner positions of a face
    pub fn face_vertices(&self, face: usize) -> Option<[Point3d; 3]> {
        let f = self.faces.get(face)?;
        Some([
            *self.vertices.get(f[0])?,
            *self.vertices.get(f[1])?,
            *self.vertices.get(f[2])?,
        ])
    }

    /// Unit normal of a single face, or zero for a degenerate face
    pub fn face_normal(&self, face: usize) -> Vector3d {
        match self.face_vertices(face) {
            Some([v0, v1, v2]) => (v1 - v0)
                .cross(&(v2 - v0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3d::zeros),
            None => Vector3d::zeros(),
        }
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3d> {
        (0..self.faces.len()).map(|i| self.face_normal(i)).collect()
    }

    /// Calculate area-weighted vertex normals
    ///
    /// Each face contributes its unnormalized cross product to its three
    /// corners. Vertices not used by any face get a zero normal.
    pub fn calculate_vertex_normals(&self) -> Vec<Vector3d> {
        let mut normals = vec![Vector3d::zeros(); self.vertices.len()];
        for face in &self.faces {
            let v0 = self.vertices[face[0]];
            let v1 = self.vertices[face[1]];
            let v2 = self.vertices[face[2]];
            let weighted = (v1 - v0).cross(&(v2 - v0));
            for &v in face {
                normals[v] += weighted;
            }
        }
        for n in &mut normals {
            *n = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3d::zeros);
        }
        normals
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3d>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals = None;
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
