//! Curve parameters

use meshcurve_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Basis used to interpolate between markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Straight segments between consecutive markers
    #[default]
    Linear,
    /// Cubic B-spline with the markers as control points
    BSpline,
    /// Natural cubic spline through the markers
    NaturalSpline,
}

impl Interpolation {
    pub const ALL: [Interpolation; 3] = [
        Interpolation::Linear,
        Interpolation::BSpline,
        Interpolation::NaturalSpline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Linear => "linear",
            Interpolation::BSpline => "bspline",
            Interpolation::NaturalSpline => "natural",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "linear" => Ok(Interpolation::Linear),
            "bspline" => Ok(Interpolation::BSpline),
            "natural" | "naturalspline" => Ok(Interpolation::NaturalSpline),
            other => Err(Error::InvalidData(format!(
                "unknown interpolation '{}', expected one of linear, bspline, natural",
                other
            ))),
        }
    }
}

/// Configuration for a surface curve
///
/// A non-positive `resolution` or a negative `normal_compute_radius` selects
/// a default derived from the host mesh size when the curve is built. A zero
/// normal radius uses flat face normals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Maximum spacing between sampled points
    pub resolution: f64,
    /// Whether the last marker connects back to the first
    pub closed: bool,
    /// Interpolation basis
    pub interpolation: Interpolation,
    /// Snap interior samples back onto the mesh
    pub project_to_mesh: bool,
    /// Radius of the Gaussian used to estimate surface normals; zero uses
    /// the flat face normal
    pub normal_compute_radius: f64,
    /// Length of rendered normal arrows; zero disables them
    pub normal_length: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            resolution: -1.0,
            closed: false,
            interpolation: Interpolation::Linear,
            project_to_mesh: true,
            normal_compute_radius: -1.0,
            normal_length: 0.0,
        }
    }
}

/// Resolution used when none is given: a hundredth of the mesh radius
pub fn default_resolution(mesh_radius: f64) -> f64 {
    mesh_radius / 100.0
}

/// Normal radius used when none is given: a fiftieth of the mesh radius
pub fn default_normal_compute_radius(mesh_radius: f64) -> f64 {
    mesh_radius / 50.0
}
