//! Surface curves
//!
//! A [`SurfaceCurve`] owns an ordered list of markers and the parameters that
//! control its discretization. Sampling is lazy: mutators mark the cached
//! buffers invalid and the next query resamples. Buffers are kept in the
//! mesh-local frame so a rigid motion of the mesh does not require
//! resampling.
//!
//! The curve holds no reference to its mesh. Every call that may sample or
//! place markers takes the mesh explicitly, and code that edits the mesh is
//! expected to call [`SurfaceCurve::invalidate`] or
//! [`SurfaceCurve::update_marker_positions`] afterwards.

use crate::config::{default_normal_compute_radius, default_resolution, CurveConfig, Interpolation};
use crate::marker::{Marker, MarkerId, MarkerState};
use crate::render::CurveLines;
use crate::sampler::{CurveSampler, SampleSettings, SampledCurve, Sampler};
use meshcurve_algorithms::polyline;
use meshcurve_core::{
    bounding_box_of, Error, Isometry3, NormalPoint3d, Point3d, Result, SurfaceMesh, Transform3D,
    Vector3d,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Persisted form of a curve: its parameters and marker bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveState {
    pub config: CurveConfig,
    pub markers: Vec<MarkerState>,
}

/// A curve whose control points are pinned to a triangulated surface
#[derive(Debug, Clone)]
pub struct SurfaceCurve {
    markers: Vec<(MarkerId, Marker)>,
    next_id: u64,
    config: CurveConfig,
    valid: bool,
    points: Vec<Point3d>,
    normals: Vec<Vector3d>,
    recompute_count: usize,
}

impl SurfaceCurve {
    /// Create an empty curve with default parameters for `mesh`.
    pub fn new<M>(mesh: &M) -> Result<Self>
    where
        M: SurfaceMesh + ?Sized,
    {
        Self::with_config(mesh, CurveConfig::default())
    }

    /// Create an empty curve. A non-positive resolution or a negative normal
    /// radius in `config` is replaced by a default derived from the mesh
    /// radius.
    pub fn with_config<M>(mesh: &M, mut config: CurveConfig) -> Result<Self>
    where
        M: SurfaceMesh + ?Sized,
    {
        if !mesh.is_triangular() {
            return Err(Error::not_triangulated());
        }
        if config.resolution <= 0.0 {
            config.resolution = default_resolution(mesh.radius());
        }
        if config.normal_compute_radius < 0.0 {
            config.normal_compute_radius = default_normal_compute_radius(mesh.radius());
        }
        Ok(Self {
            markers: Vec::new(),
            next_id: 0,
            config,
            valid: false,
            points: Vec::new(),
            normals: Vec::new(),
            recompute_count: 0,
        })
    }

    /// Rebuild a curve from a persisted state.
    pub fn from_state<M>(mesh: &M, state: &CurveState) -> Result<Self>
    where
        M: SurfaceMesh + ?Sized,
    {
        let mut curve = Self::with_config(mesh, state.config.clone())?;
        for marker in &state.markers {
            let marker = Marker::from_state(mesh, marker, curve.config.normal_compute_radius)?;
            curve.push_marker(marker);
        }
        Ok(curve)
    }

    pub fn state(&self) -> CurveState {
        CurveState {
            config: self.config.clone(),
            markers: self.markers.iter().map(|(_, m)| m.state()).collect(),
        }
    }

    /// Effective parameters
    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    // Markers

    fn push_marker(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push((id, marker));
        self.invalidate();
        id
    }

    /// Append a marker at the mesh point nearest `position`.
    pub fn add_marker<M>(&mut self, mesh: &M, position: &Point3d) -> Result<MarkerId>
    where
        M: SurfaceMesh + ?Sized,
    {
        let marker = Marker::from_point(mesh, position, self.config.normal_compute_radius)?;
        Ok(self.push_marker(marker))
    }

    /// Append a marker bound to `face` with barycentric weights `s1`, `s2`.
    pub fn add_marker_at<M>(&mut self, mesh: &M, face: usize, s1: f64, s2: f64) -> Result<MarkerId>
    where
        M: SurfaceMesh + ?Sized,
    {
        let marker = Marker::from_barycentric(mesh, face, s1, s2, self.config.normal_compute_radius)?;
        Ok(self.push_marker(marker))
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        match self.markers.iter().position(|(mid, _)| *mid == id) {
            Some(idx) => {
                self.markers.remove(idx);
                self.invalidate();
                true
            }
            None => false,
        }
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.invalidate();
    }

    pub fn num_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|(mid, _)| *mid == id).map(|(_, m)| m)
    }

    /// Markers in curve order
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &Marker)> + '_ {
        self.markers.iter().map(|(id, m)| (*id, m))
    }

    /// Move a marker to the mesh point nearest `position`.
    ///
    /// Returns false when the id is unknown.
    pub fn set_marker_position<M>(&mut self, mesh: &M, id: MarkerId, position: &Point3d) -> bool
    where
        M: SurfaceMesh + ?Sized,
    {
        let Some((_, marker)) = self.markers.iter_mut().find(|(mid, _)| *mid == id) else {
            return false;
        };
        marker.set_world_position(mesh, position);
        self.invalidate();
        true
    }

    /// Recompute every marker's world position and normal after the mesh
    /// moved or was edited.
    pub fn update_marker_positions<M>(&mut self, mesh: &M)
    where
        M: SurfaceMesh + ?Sized,
    {
        for (_, marker) in &mut self.markers {
            marker.update_position(mesh);
            marker.clear_normal();
        }
        self.invalidate();
    }

    /// Bounding box of the marker positions
    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        if self.markers.is_empty() {
            return None;
        }
        let positions: Vec<Point3d> = self.markers.iter().map(|(_, m)| m.position()).collect();
        Some(bounding_box_of(&positions))
    }

    // Parameters

    pub fn resolution(&self) -> f64 {
        self.config.resolution
    }

    /// Set the sample spacing; non-positive values select the mesh default.
    pub fn set_resolution<M>(&mut self, mesh: &M, resolution: f64)
    where
        M: SurfaceMesh + ?Sized,
    {
        let resolution = if resolution <= 0.0 {
            default_resolution(mesh.radius())
        } else {
            resolution
        };
        if resolution != self.config.resolution {
            self.config.resolution = resolution;
            self.invalidate();
        }
    }

    pub fn normal_compute_radius(&self) -> f64 {
        self.config.normal_compute_radius
    }

    /// Set the normal estimation radius for the curve and its markers;
    /// negative values select the mesh default and zero selects flat face
    /// normals.
    pub fn set_normal_compute_radius<M>(&mut self, mesh: &M, radius: f64)
    where
        M: SurfaceMesh + ?Sized,
    {
        let radius = if radius < 0.0 {
            default_normal_compute_radius(mesh.radius())
        } else {
            radius
        };
        if radius != self.config.normal_compute_radius {
            self.config.normal_compute_radius = radius;
            for (_, marker) in &mut self.markers {
                marker.set_normal_compute_radius(radius);
            }
            self.invalidate();
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.config.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        if interpolation != self.config.interpolation {
            self.config.interpolation = interpolation;
            self.invalidate();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.config.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        if closed != self.config.closed {
            self.config.closed = closed;
            self.invalidate();
        }
    }

    pub fn project_to_mesh(&self) -> bool {
        self.config.project_to_mesh
    }

    pub fn set_project_to_mesh(&mut self, project: bool) {
        if project != self.config.project_to_mesh {
            self.config.project_to_mesh = project;
            self.invalidate();
        }
    }

    pub fn normal_length(&self) -> f64 {
        self.config.normal_length
    }

    /// Only affects render buffers, so the samples stay valid.
    pub fn set_normal_length(&mut self, length: f64) {
        self.config.normal_length = length;
    }

    // Cache

    /// Mark the sampled buffers stale
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of times the curve has been resampled
    pub fn recompute_count(&self) -> usize {
        self.recompute_count
    }

    /// Resample if any mutation happened since the last sampling.
    pub fn ensure_valid<M>(&mut self, mesh: &M)
    where
        M: SurfaceMesh + ?Sized,
    {
        if self.valid {
            return;
        }

        let controls: Vec<NormalPoint3d> = self
            .markers
            .iter_mut()
            .map(|(_, m)| NormalPoint3d::new(m.position(), m.normal(mesh)))
            .collect();

        let settings = SampleSettings {
            resolution: self.config.resolution,
            project_to_mesh: self.config.project_to_mesh,
            normal_compute_radius: self.config.normal_compute_radius,
        };
        let sampled = Sampler::build(self.config.interpolation, controls, self.config.closed)
            .map(|sampler| sampler.sample(mesh, &settings))
            .unwrap_or_default();

        for ((_, marker), index) in self.markers.iter_mut().zip(&sampled.marker_indices) {
            marker.set_curve_point_index(*index);
        }
        self.store_local(mesh, sampled);

        self.valid = true;
        self.recompute_count += 1;
        debug!(
            markers = self.markers.len(),
            points = self.points.len(),
            interpolation = %self.config.interpolation,
            closed = self.config.closed,
            "resampled surface curve"
        );
    }

    /// Move sampled world-space buffers into the mesh-local frame
    fn store_local<M>(&mut self, mesh: &M, sampled: SampledCurve)
    where
        M: SurfaceMesh + ?Sized,
    {
        let world_to_mesh = mesh.mesh_to_world().inverse().unwrap_or_else(|| {
            warn!("mesh-to-world transform is singular, caching curve in world frame");
            Transform3D::identity()
        });
        self.points = sampled
            .points
            .iter()
            .map(|p| world_to_mesh.transform_point(p))
            .collect();
        self.normals = sampled
            .normals
            .iter()
            .map(|n| world_to_mesh.transform_normal(n))
            .collect();
    }

    // Queries. Points, normals and query inputs are in the mesh-local frame.

    pub fn num_points<M>(&mut self, mesh: &M) -> usize
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        self.points.len()
    }

    pub fn points<M>(&mut self, mesh: &M) -> &[Point3d]
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        &self.points
    }

    pub fn point<M>(&mut self, mesh: &M, idx: usize) -> Option<Point3d>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        self.points.get(idx).copied()
    }

    pub fn normals<M>(&mut self, mesh: &M) -> &[Vector3d]
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        &self.normals
    }

    pub fn normal<M>(&mut self, mesh: &M, idx: usize) -> Option<Vector3d>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        self.normals.get(idx).copied()
    }

    /// Finite-difference tangent at sampled point `idx` (not normalized)
    pub fn tangent<M>(&mut self, mesh: &M, idx: usize) -> Vector3d
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        polyline::tangent(&self.points, self.config.closed, idx)
    }

    /// First location `r = k + s` whose straight-line distance from `p0` is
    /// `dist`, scanning from `r0` on open curves and from the start on closed
    /// ones.
    pub fn find_point_at_distance<M>(
        &mut self,
        mesh: &M,
        p0: &Point3d,
        dist: f64,
        r0: f64,
    ) -> Option<(f64, Point3d)>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        polyline::find_point_at_distance(&self.points, self.config.closed, p0, dist, r0)
    }

    /// Closest location `r = k + s` to `p0`; `(0, origin)` on an empty curve.
    pub fn find_nearest_point<M>(&mut self, mesh: &M, p0: &Point3d, r0: f64) -> (f64, Point3d)
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        polyline::find_nearest_point(&self.points, self.config.closed, p0, r0)
    }

    /// Sampled points in world coordinates
    pub fn world_points<M>(&mut self, mesh: &M) -> Vec<Point3d>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        let mesh_to_world = mesh.mesh_to_world();
        self.points
            .iter()
            .map(|p| mesh_to_world.transform_point(p))
            .collect()
    }

    /// World frame of a marker, with x along the curve where it has been
    /// sampled
    pub fn marker_pose<M>(&mut self, mesh: &M, id: MarkerId) -> Option<Isometry3<f64>>
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        let closed = self.config.closed;
        let points = &self.points;
        let (_, marker) = self.markers.iter_mut().find(|(mid, _)| *mid == id)?;
        let tangent = marker
            .curve_point_index()
            .map(|k| mesh.mesh_to_world().transform_vector(&polyline::tangent(points, closed, k)));
        Some(marker.pose(mesh, tangent.as_ref()))
    }

    /// Line and normal-arrow buffers for drawing the curve
    pub fn lines<M>(&mut self, mesh: &M) -> CurveLines
    where
        M: SurfaceMesh + ?Sized,
    {
        self.ensure_valid(mesh);
        CurveLines::build(
            &self.points,
            &self.normals,
            self.config.closed,
            self.config.normal_length,
        )
    }
}
