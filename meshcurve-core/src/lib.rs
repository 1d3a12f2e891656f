//! Core data structures and traits for meshcurve
//! 
//! This crate provides the fundamental types shared by the surface curve engine:
//! double precision points, triangle meshes, mesh-to-world transforms, and the
//! capability traits a host mesh must offer.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3, Matrix4, Isometry3, UnitQuaternion};
