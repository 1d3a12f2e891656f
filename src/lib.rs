//! # MeshCurve
//!
//! Curves pinned to triangulated surfaces.
//!
//! This is the umbrella crate that provides convenient access to all MeshCurve functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Points, triangle meshes, mesh-to-world transforms and the host mesh traits
//! - **Algorithms**: Indexed meshes, projection, normal estimation, spline kernels
//! - **Curve**: Markers and lazily sampled surface curves
//!
//! ## Quick Start
//!
//! ```rust
//! use meshcurve::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mesh = MeshSurface::new(TriangleMesh::from_vertices_and_faces(
//!     vec![
//!         Point3d::new(0.0, 0.0, 0.0),
//!         Point3d::new(1.0, 0.0, 0.0),
//!         Point3d::new(1.0, 1.0, 0.0),
//!         Point3d::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! ))?;
//!
//! let mut curve = SurfaceCurve::new(&mesh)?;
//! curve.set_resolution(&mesh, 0.5);
//! curve.add_marker(&mesh, &Point3d::new(0.0, 0.0, 0.0))?;
//! curve.add_marker(&mesh, &Point3d::new(1.0, 0.0, 0.0))?;
//!
//! assert_eq!(curve.num_points(&mesh), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms and curve
//! - `algorithms`: Mesh queries and interpolation kernels
//! - `curve`: Markers and surface curves (implies `algorithms`)

// Re-export core functionality
pub use meshcurve_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use meshcurve_algorithms as algorithms;

#[cfg(feature = "curve")]
pub use meshcurve_curve as curve;

/// Convenient imports for common use cases
pub mod prelude {
    pub use meshcurve_core::{
        Error, FaceHit, NormalPoint3d, Point3d, Result, SurfaceMesh, Transform3D, TriangleMesh,
        Vector3d,
    };

    #[cfg(feature = "algorithms")]
    pub use meshcurve_algorithms::{MeshSurface, SurfaceProjector};

    #[cfg(feature = "curve")]
    pub use meshcurve_curve::{
        CurveConfig, CurveLines, CurveState, Interpolation, Marker, MarkerId, MarkerState,
        SurfaceCurve,
    };
}
