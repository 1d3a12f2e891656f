//! Point types and related functionality

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use bytemuck::{Pod, Zeroable};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A point with normal vector
///
/// This is the element type of sampled curve buffers, laid out so that a
/// renderer can upload a slice of them without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct NormalPoint3d {
    pub position: Point3d,
    pub normal: Vector3d,
}

unsafe impl Pod for NormalPoint3d {}
unsafe impl Zeroable for NormalPoint3d {}

impl NormalPoint3d {
    pub fn new(position: Point3d, normal: Vector3d) -> Self {
        Self { position, normal }
    }
}

impl Default for NormalPoint3d {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            normal: Vector3d::new(0.0, 0.0, 1.0),
        }
    }
}

/// Result of a face query against a host mesh
///
/// `point` is the located point in world coordinates and `barycentric` holds
/// the weights `(s1, s2)` of the face's second and third vertices; the weight
/// of the first vertex is `1 - s1 - s2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    pub face: usize,
    pub point: Point3d,
    pub barycentric: (f64, f64),
}

impl FaceHit {
    /// Weight of the face's first vertex
    pub fn s0(&self) -> f64 {
        1.0 - self.barycentric.0 - self.barycentric.1
    }
}

/// Combine three points with barycentric weights `(1 - s1 - s2, s1, s2)`
pub fn barycentric_combine(corners: &[Point3d; 3], s1: f64, s2: f64) -> Point3d {
    let s0 = 1.0 - s1 - s2;
    Point3d::from(corners[0].coords * s0 + corners[1].coords * s1 + corners[2].coords * s2)
}
