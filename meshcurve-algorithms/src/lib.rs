//! # MeshCurve Algorithms
//!
//! Geometric kernels behind the surface curve engine.
//!
//! This crate provides the indexed host mesh, projection onto the surface,
//! Gaussian-weighted normal estimation, the spline bases used to interpolate
//! markers, and parametric queries over discretized polylines.

pub mod geometry;
pub mod spatial;
pub mod normals;
pub mod surface;
pub mod projection;
pub mod spline;
pub mod polyline;

// Re-export commonly used items
pub use geometry::*;
pub use spatial::*;
pub use normals::*;
pub use surface::*;
pub use projection::*;
pub use spline::{NaturalCubicSpline, SplineValue, UniformBSpline};
