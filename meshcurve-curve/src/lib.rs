//! # MeshCurve Curve
//!
//! Markers pinned to triangulated surfaces and the resolution-controlled
//! curves that interpolate them.

pub mod config;
pub mod marker;
pub mod sampler;
pub mod curve;
pub mod render;

pub use config::*;
pub use marker::*;
pub use sampler::*;
pub use curve::*;
pub use render::*;
