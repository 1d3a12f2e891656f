//! Render buffers for sampled curves

use itertools::Itertools;
use meshcurve_core::{NormalPoint3d, Point3d, Vector3d};

/// Line geometry for drawing a curve in its mesh-local frame
///
/// A renderer places the buffers with the mesh-to-world transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveLines {
    /// Sampled points with their normals
    pub vertices: Vec<NormalPoint3d>,
    /// Index pairs into `vertices`
    pub lines: Vec<[u32; 2]>,
    /// Arrow segments from each point along its normal, present when the
    /// normal length is positive
    pub normal_arrows: Option<Vec<[Point3d; 2]>>,
}

impl CurveLines {
    pub fn build(points: &[Point3d], normals: &[Vector3d], closed: bool, normal_length: f64) -> Self {
        let vertices: Vec<NormalPoint3d> = points
            .iter()
            .zip(normals)
            .map(|(p, n)| NormalPoint3d::new(*p, *n))
            .collect();

        let count = vertices.len() as u32;
        let mut lines: Vec<[u32; 2]> = (0..count).tuple_windows().map(|(a, b)| [a, b]).collect();
        if closed && count > 1 {
            lines.push([count - 1, 0]);
        }

        let normal_arrows = (normal_length > 0.0).then(|| {
            vertices
                .iter()
                .map(|v| [v.position, v.position + v.normal * normal_length])
                .collect()
        });

        Self {
            vertices,
            lines,
            normal_arrows,
        }
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
