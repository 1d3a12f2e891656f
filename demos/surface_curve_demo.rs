//! Surface curve demo
//!
//! Builds a bumpy height-field mesh, places a ring of markers on it and
//! samples a curve through them:
//! - Marker placement by projection onto the surface
//! - Linear, B-spline and natural spline interpolation
//! - Re-projection of samples onto the surface
//! - Nearest-point and distance queries on the result

use anyhow::{Context, Result};
use clap::Parser;
use meshcurve_algorithms::MeshSurface;
use meshcurve_core::{Point3d, SurfaceMesh, Transform3D, TriangleMesh, UnitQuaternion, Vector3d};
use meshcurve_curve::{CurveConfig, Interpolation, SurfaceCurve};

/// Sample a curve over a generated surface
#[derive(Parser)]
#[command(name = "surface_curve_demo")]
#[command(about = "Sample a marker-driven curve over a height-field mesh", long_about = None)]
struct Args {
    /// Grid cells along each side of the mesh
    #[arg(long, default_value_t = 32)]
    grid: usize,

    /// Number of markers placed on a ring
    #[arg(long, default_value_t = 6)]
    markers: usize,

    /// Interpolation basis: linear, bspline or natural
    #[arg(long, default_value = "natural")]
    interpolation: Interpolation,

    /// Sample spacing; non-positive uses the mesh default
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    resolution: f64,

    /// Connect the last marker back to the first
    #[arg(long)]
    closed: bool,

    /// Keep interpolated samples off the surface
    #[arg(long)]
    no_project: bool,

    /// Rotate the mesh about z by this many degrees after sampling
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f64,

    /// Print every sampled point
    #[arg(long)]
    verbose: bool,
}

fn height_field(n: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for j in 0..=n {
        for i in 0..=n {
            let x = i as f64 / n as f64;
            let y = j as f64 / n as f64;
            let z = 0.15 * (3.0 * x).sin() * (2.0 * y).cos();
            mesh.add_vertex(Point3d::new(x, y, z));
        }
    }
    let row = n + 1;
    for j in 0..n {
        for i in 0..n {
            let v = j * row + i;
            mesh.add_face([v, v + 1, v + row + 1]);
            mesh.add_face([v, v + row + 1, v + row]);
        }
    }
    mesh
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("meshcurve surface curve demo");
    println!("============================");

    let mut mesh = MeshSurface::new(height_field(args.grid.max(1)))
        .context("failed to index the height-field mesh")?;
    println!(
        "Mesh: {} vertices, {} faces, radius {:.4}",
        mesh.mesh().vertex_count(),
        mesh.num_faces(),
        mesh.radius()
    );

    let config = CurveConfig {
        resolution: args.resolution,
        closed: args.closed,
        interpolation: args.interpolation,
        project_to_mesh: !args.no_project,
        ..CurveConfig::default()
    };
    let mut curve = SurfaceCurve::with_config(&mesh, config)?;

    for k in 0..args.markers {
        let angle = k as f64 / args.markers as f64 * std::f64::consts::TAU;
        let target = Point3d::new(0.5 + 0.3 * angle.cos(), 0.5 + 0.3 * angle.sin(), 1.0);
        let id = curve.add_marker(&mesh, &target)?;
        if let Some(marker) = curve.marker(id) {
            let p = marker.position();
            println!("  marker {} on face {} at ({:.3}, {:.3}, {:.3})", k, marker.face_index(), p.x, p.y, p.z);
        }
    }

    println!(
        "\nCurve: {} interpolation, closed={}, resolution {:.4}, projected={}",
        curve.interpolation(),
        curve.is_closed(),
        curve.resolution(),
        curve.project_to_mesh()
    );
    let count = curve.num_points(&mesh);
    println!("Sampled {} points", count);
    if args.verbose {
        let points = curve.points(&mesh).to_vec();
        let normals = curve.normals(&mesh).to_vec();
        for (i, (p, n)) in points.iter().zip(&normals).enumerate() {
            println!(
                "  {:4}: ({:.4}, {:.4}, {:.4})  n=({:.3}, {:.3}, {:.3})",
                i, p.x, p.y, p.z, n.x, n.y, n.z
            );
        }
    }

    let center = Point3d::new(0.5, 0.5, 0.0);
    let (r, nearest) = curve.find_nearest_point(&mesh, &center, 0.0);
    println!(
        "\nNearest point to the centre: r = {:.4} at ({:.4}, {:.4}, {:.4})",
        r, nearest.x, nearest.y, nearest.z
    );
    match curve.find_point_at_distance(&mesh, &center, 0.3, 0.0) {
        Some((r, p)) => println!("First point 0.3 from the centre: r = {:.4} at ({:.4}, {:.4}, {:.4})", r, p.x, p.y, p.z),
        None => println!("No point of the curve is 0.3 from the centre"),
    }

    let lines = curve.lines(&mesh);
    println!("Render buffer: {} vertices, {} lines", lines.vertices.len(), lines.num_lines());

    if args.rotate != 0.0 {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3d::z_axis(), args.rotate.to_radians());
        mesh.set_mesh_to_world(Transform3D::from_translation_rotation(Vector3d::zeros(), rotation))?;
        let world = curve.world_points(&mesh);
        println!(
            "\nAfter rotating the mesh {:.1} degrees: {} resamples, first world point ({:.4}, {:.4}, {:.4})",
            args.rotate,
            curve.recompute_count(),
            world.first().map_or(0.0, |p| p.x),
            world.first().map_or(0.0, |p| p.y),
            world.first().map_or(0.0, |p| p.z)
        );
    }

    Ok(())
}
