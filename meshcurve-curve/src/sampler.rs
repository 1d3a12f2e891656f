//! Discretization of a marker sequence into points and normals
//!
//! Every interpolation basis implements [`CurveSampler::interpolate`]; the
//! shared [`CurveSampler::sample`] driver walks the marker intervals, places
//! the markers themselves exactly, and optionally snaps interior samples onto
//! the mesh.

use crate::config::Interpolation;
use meshcurve_algorithms::{NaturalCubicSpline, SurfaceProjector, UniformBSpline};
use meshcurve_core::{NormalPoint3d, Point3d, SurfaceMesh, Vector3d};
use tracing::trace;

/// Settings shared by every sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSettings {
    pub resolution: f64,
    pub project_to_mesh: bool,
    pub normal_compute_radius: f64,
}

/// Output of a sampling pass, in world coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledCurve {
    pub points: Vec<Point3d>,
    pub normals: Vec<Vector3d>,
    /// Position of each control point in `points`
    pub marker_indices: Vec<Option<usize>>,
}

impl SampledCurve {
    fn push(&mut self, point: Point3d, normal: Vector3d) {
        self.points.push(point);
        self.normals.push(normal);
    }
}

/// Number of subdivisions for a marker interval of the given chord length
pub fn segment_count(chord: f64, resolution: f64) -> usize {
    if !(chord > 0.0) {
        return 0;
    }
    if !(resolution > 0.0) {
        return 1;
    }
    (chord / resolution).ceil() as usize
}

pub trait CurveSampler {
    /// Control points in curve order, in world coordinates
    fn controls(&self) -> &[NormalPoint3d];

    fn is_closed(&self) -> bool;

    /// Raw position and normal direction at fraction `s` of marker interval
    /// `interval`
    fn interpolate(&self, interval: usize, s: f64) -> (Point3d, Vector3d);

    /// Sample every marker interval.
    ///
    /// Open curves have `n - 1` intervals and closed curves `n`, the last one
    /// running from the final marker back to the first. Each interval emits
    /// its start marker followed by `nsegs - 1` interior samples; an open
    /// curve also emits its final marker. Fewer than two controls produce an
    /// empty result.
    fn sample<M>(&self, mesh: &M, settings: &SampleSettings) -> SampledCurve
    where
        M: SurfaceMesh + ?Sized,
    {
        let controls = self.controls();
        let n = controls.len();
        let mut out = SampledCurve {
            marker_indices: vec![None; n],
            ..SampledCurve::default()
        };
        if n < 2 {
            return out;
        }

        let closed = self.is_closed();
        let num_intervals = if closed { n } else { n - 1 };
        let projector = SurfaceProjector::new();

        for i in 0..num_intervals {
            let j = (i + 1) % n;
            let start = &controls[i];
            let end = &controls[j];

            out.marker_indices[i] = Some(out.points.len());
            out.push(start.position, start.normal);

            let nsegs = segment_count((end.position - start.position).norm(), settings.resolution);
            for k in 1..nsegs {
                let s = k as f64 / nsegs as f64;
                let (point, direction) = self.interpolate(i, s);
                let direction = direction.try_normalize(f64::EPSILON).unwrap_or(direction);

                let snapped = if settings.project_to_mesh {
                    projector.project(mesh, &point, &direction)
                } else {
                    None
                };
                match snapped {
                    Some(hit) => {
                        let normal = mesh.estimate_surface_normal(
                            &hit.point,
                            hit.face,
                            settings.normal_compute_radius,
                        );
                        out.push(hit.point, normal);
                    }
                    None => out.push(point, direction),
                }
            }

            if !closed && i == num_intervals - 1 {
                out.marker_indices[j] = Some(out.points.len());
                out.push(end.position, end.normal);
            }
            trace!(interval = i, nsegs, "sampled marker interval");
        }

        out
    }
}

/// Straight-line blend between consecutive markers
#[derive(Debug, Clone)]
pub struct LinearSampler {
    controls: Vec<NormalPoint3d>,
    closed: bool,
}

impl LinearSampler {
    pub fn new(controls: Vec<NormalPoint3d>, closed: bool) -> Self {
        Self { controls, closed }
    }
}

impl CurveSampler for LinearSampler {
    fn controls(&self) -> &[NormalPoint3d] {
        &self.controls
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn interpolate(&self, interval: usize, s: f64) -> (Point3d, Vector3d) {
        let n = self.controls.len();
        let a = &self.controls[interval % n];
        let b = &self.controls[(interval + 1) % n];
        (a.position.lerp(&b.position, s), a.normal.lerp(&b.normal, s))
    }
}

/// Cubic B-spline with markers as control points, clamped when open and
/// periodic when closed
#[derive(Debug, Clone)]
pub struct BSplineSampler {
    controls: Vec<NormalPoint3d>,
    closed: bool,
    positions: UniformBSpline<Vector3d>,
    normals: UniformBSpline<Vector3d>,
}

impl BSplineSampler {
    /// Returns `None` without controls.
    pub fn new(controls: Vec<NormalPoint3d>, closed: bool) -> Option<Self> {
        let build = |values: Vec<Vector3d>| {
            if closed {
                UniformBSpline::periodic(values)
            } else {
                UniformBSpline::open(values, 3)
            }
        };
        let positions = build(controls.iter().map(|c| c.position.coords).collect())?;
        let normals = build(controls.iter().map(|c| c.normal).collect())?;
        Some(Self {
            controls,
            closed,
            positions,
            normals,
        })
    }
}

impl CurveSampler for BSplineSampler {
    fn controls(&self) -> &[NormalPoint3d] {
        &self.controls
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn interpolate(&self, interval: usize, s: f64) -> (Point3d, Vector3d) {
        (
            Point3d::from(self.positions.evaluate_interval(interval, s)),
            self.normals.evaluate_interval(interval, s),
        )
    }
}

/// Natural cubic spline through the markers, periodic when closed
#[derive(Debug, Clone)]
pub struct NaturalSplineSampler {
    controls: Vec<NormalPoint3d>,
    closed: bool,
    positions: NaturalCubicSpline<Vector3d>,
    normals: NaturalCubicSpline<Vector3d>,
}

impl NaturalSplineSampler {
    /// Returns `None` without controls.
    pub fn new(controls: Vec<NormalPoint3d>, closed: bool) -> Option<Self> {
        let positions =
            NaturalCubicSpline::new(controls.iter().map(|c| c.position.coords).collect(), closed)?;
        let normals = NaturalCubicSpline::new(controls.iter().map(|c| c.normal).collect(), closed)?;
        Some(Self {
            controls,
            closed,
            positions,
            normals,
        })
    }
}

impl CurveSampler for NaturalSplineSampler {
    fn controls(&self) -> &[NormalPoint3d] {
        &self.controls
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn interpolate(&self, interval: usize, s: f64) -> (Point3d, Vector3d) {
        (
            Point3d::from(self.positions.evaluate_interval(interval, s)),
            self.normals.evaluate_interval(interval, s),
        )
    }
}

/// The sampler selected by an [`Interpolation`] mode
#[derive(Debug, Clone)]
pub enum Sampler {
    Linear(LinearSampler),
    BSpline(BSplineSampler),
    NaturalSpline(NaturalSplineSampler),
}

impl Sampler {
    /// Build the sampler for `mode`. Returns `None` without controls.
    pub fn build(mode: Interpolation, controls: Vec<NormalPoint3d>, closed: bool) -> Option<Self> {
        if controls.is_empty() {
            return None;
        }
        let sampler = match mode {
            Interpolation::Linear => Sampler::Linear(LinearSampler::new(controls, closed)),
            Interpolation::BSpline => Sampler::BSpline(BSplineSampler::new(controls, closed)?),
            Interpolation::NaturalSpline => {
                Sampler::NaturalSpline(NaturalSplineSampler::new(controls, closed)?)
            }
        };
        Some(sampler)
    }

    pub fn interpolation(&self) -> Interpolation {
        match self {
            Sampler::Linear(_) => Interpolation::Linear,
            Sampler::BSpline(_) => Interpolation::BSpline,
            Sampler::NaturalSpline(_) => Interpolation::NaturalSpline,
        }
    }
}

impl CurveSampler for Sampler {
    fn controls(&self) -> &[NormalPoint3d] {
        match self {
            Sampler::Linear(s) => s.controls(),
            Sampler::BSpline(s) => s.controls(),
            Sampler::NaturalSpline(s) => s.controls(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Sampler::Linear(s) => s.is_closed(),
            Sampler::BSpline(s) => s.is_closed(),
            Sampler::NaturalSpline(s) => s.is_closed(),
        }
    }

    fn interpolate(&self, interval: usize, s: f64) -> (Point3d, Vector3d) {
        match self {
            Sampler::Linear(inner) => inner.interpolate(interval, s),
            Sampler::BSpline(inner) => inner.interpolate(interval, s),
            Sampler::NaturalSpline(inner) => inner.interpolate(interval, s),
        }
    }
}
