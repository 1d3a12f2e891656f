//! Markers bound to mesh faces
//!
//! A marker stores a face index and barycentric weights. Its world position
//! is derived from the face's current world vertices and cached until
//! [`Marker::update_position`] is called; its surface normal is computed
//! lazily and cached until the binding or compute radius changes.

use meshcurve_core::{
    barycentric_combine, Error, Isometry3, Matrix3, Point3d, Result, SurfaceMesh, UnitQuaternion,
    Vector3d,
};
use nalgebra::{Rotation3, Translation3};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Opaque handle for a marker owned by a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub(crate) u64);

/// Persisted form of a marker: its face binding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerState {
    pub face_index: usize,
    pub s1: f64,
    pub s2: f64,
}

/// A point pinned to one triangle of a host mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    face_index: usize,
    s1: f64,
    s2: f64,
    position: Point3d,
    cached_normal: Option<Vector3d>,
    normal_compute_radius: f64,
    curve_point_index: Option<usize>,
}

impl Marker {
    /// Bind a marker to `face` with barycentric weights `s1`, `s2` for the
    /// face's second and third vertices.
    pub fn from_barycentric<M>(
        mesh: &M,
        face_index: usize,
        s1: f64,
        s2: f64,
        normal_compute_radius: f64,
    ) -> Result<Self>
    where
        M: SurfaceMesh + ?Sized,
    {
        if !mesh.is_triangular() {
            return Err(Error::not_triangulated());
        }
        let mut marker = Self::unplaced(face_index, s1, s2, normal_compute_radius);
        marker.update_position(mesh);
        Ok(marker)
    }

    fn unplaced(face_index: usize, s1: f64, s2: f64, normal_compute_radius: f64) -> Self {
        Self {
            face_index,
            s1,
            s2,
            position: Point3d::origin(),
            cached_normal: None,
            normal_compute_radius,
            curve_point_index: None,
        }
    }

    /// Bind a marker to the face nearest `point`.
    ///
    /// When the mesh yields no face the marker falls back to face 0 with
    /// weights `(0, 0)`.
    pub fn from_point<M>(mesh: &M, point: &Point3d, normal_compute_radius: f64) -> Result<Self>
    where
        M: SurfaceMesh + ?Sized,
    {
        if !mesh.is_triangular() {
            return Err(Error::not_triangulated());
        }
        let mut marker = Self::unplaced(0, 0.0, 0.0, normal_compute_radius);
        marker.set_world_position(mesh, point);
        Ok(marker)
    }

    pub fn from_state<M>(mesh: &M, state: &MarkerState, normal_compute_radius: f64) -> Result<Self>
    where
        M: SurfaceMesh + ?Sized,
    {
        Self::from_barycentric(mesh, state.face_index, state.s1, state.s2, normal_compute_radius)
    }

    pub fn state(&self) -> MarkerState {
        MarkerState {
            face_index: self.face_index,
            s1: self.s1,
            s2: self.s2,
        }
    }

    pub fn face_index(&self) -> usize {
        self.face_index
    }

    /// Barycentric weights `(s0, s1, s2)` with `s0 = 1 - s1 - s2`
    pub fn barycentric(&self) -> (f64, f64, f64) {
        (1.0 - self.s1 - self.s2, self.s1, self.s2)
    }

    /// World position as of the last update
    pub fn position(&self) -> Point3d {
        self.position
    }

    /// Recompute the world position from the face's current world vertices.
    ///
    /// A face index beyond the mesh's face count leaves the marker at the
    /// origin.
    pub fn update_position<M>(&mut self, mesh: &M)
    where
        M: SurfaceMesh + ?Sized,
    {
        self.position = match mesh.face_world_vertices(self.face_index) {
            Some(corners) => barycentric_combine(&corners, self.s1, self.s2),
            None => {
                warn!(
                    face = self.face_index,
                    num_faces = mesh.num_faces(),
                    "marker face is out of range, placing marker at origin"
                );
                Point3d::origin()
            }
        };
    }

    /// Rebind the marker to the face nearest `point` and clear its normal.
    pub fn set_world_position<M>(&mut self, mesh: &M, point: &Point3d)
    where
        M: SurfaceMesh + ?Sized,
    {
        self.cached_normal = None;
        match mesh.nearest_face_to_point(point) {
            Some(hit) => {
                self.face_index = hit.face;
                (self.s1, self.s2) = hit.barycentric;
                self.update_position(mesh);
            }
            None => {
                self.face_index = 0;
                self.s1 = 0.0;
                self.s2 = 0.0;
                self.position = Point3d::origin();
            }
        }
    }

    /// Surface normal at the marker, computed on first use
    pub fn normal<M>(&mut self, mesh: &M) -> Vector3d
    where
        M: SurfaceMesh + ?Sized,
    {
        if let Some(normal) = self.cached_normal {
            return normal;
        }
        let normal =
            mesh.estimate_surface_normal(&self.position, self.face_index, self.normal_compute_radius);
        self.cached_normal = Some(normal);
        normal
    }

    pub fn cached_normal(&self) -> Option<Vector3d> {
        self.cached_normal
    }

    pub fn clear_normal(&mut self) {
        self.cached_normal = None;
    }

    pub fn normal_compute_radius(&self) -> f64 {
        self.normal_compute_radius
    }

    pub fn set_normal_compute_radius(&mut self, radius: f64) {
        if radius != self.normal_compute_radius {
            self.normal_compute_radius = radius;
            self.cached_normal = None;
        }
    }

    /// Index of this marker's sample in its curve's point buffer, once the
    /// curve has been sampled
    pub fn curve_point_index(&self) -> Option<usize> {
        self.curve_point_index
    }

    pub(crate) fn set_curve_point_index(&mut self, index: Option<usize>) {
        self.curve_point_index = index;
    }

    /// Orthonormal frame at the marker with z along the surface normal.
    ///
    /// The x axis follows `tangent` projected into the tangent plane. Without
    /// a usable tangent an arbitrary in-plane direction is chosen.
    pub fn pose<M>(&mut self, mesh: &M, tangent: Option<&Vector3d>) -> Isometry3<f64>
    where
        M: SurfaceMesh + ?Sized,
    {
        let z = self
            .normal(mesh)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3d::z);
        let x = tangent
            .and_then(|t| (t - z * z.dot(t)).try_normalize(1e-12))
            .unwrap_or_else(|| perpendicular_to(&z));
        let y = z.cross(&x);

        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
        Isometry3::from_parts(
            Translation3::from(self.position.coords),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
    }
}

/// Some unit vector perpendicular to the unit vector `z`
fn perpendicular_to(z: &Vector3d) -> Vector3d {
    let helper = if z.x.abs() < 0.9 { Vector3d::x() } else { Vector3d::y() };
    (helper - z * z.dot(&helper)).normalize()
}
