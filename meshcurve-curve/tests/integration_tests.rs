//! Integration tests for meshcurve-curve
//!
//! These tests drive surface curves end to end over concrete meshes: marker
//! placement, sampling with each interpolation basis, projection, caching,
//! and the parametric queries.

use approx::assert_relative_eq;
use meshcurve_algorithms::MeshSurface;
use meshcurve_core::{
    Error, FaceHit, Point3d, SurfaceMesh, Transform3D, TriangleMesh, UnitQuaternion, Vector3d,
};
use meshcurve_curve::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Two triangles covering the unit square in the plane z = 0
fn unit_square() -> MeshSurface {
    MeshSurface::new(TriangleMesh::from_vertices_and_faces(
        vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    ))
    .unwrap()
}

/// Regular grid over the unit square lifted by `height`
fn height_field(n: usize, height: impl Fn(f64, f64) -> f64) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for j in 0..=n {
        for i in 0..=n {
            let x = i as f64 / n as f64;
            let y = j as f64 / n as f64;
            mesh.add_vertex(Point3d::new(x, y, height(x, y)));
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

fn ridge_height(x: f64) -> f64 {
    0.2 * (std::f64::consts::PI * x).sin()
}

fn ridge() -> MeshSurface {
    MeshSurface::new(height_field(24, |x, _| ridge_height(x))).unwrap()
}

/// A point on the smooth ridge profile, just above its tessellation
fn on_ridge(x: f64, y: f64) -> Point3d {
    Point3d::new(x, y, ridge_height(x))
}

/// Two triangles folded 90 degrees along the y axis: face 0 lies in z = 0
/// with normal +z, face 1 in x = 0 with normal +x
fn folded() -> MeshSurface {
    MeshSurface::new(TriangleMesh::from_vertices_and_faces(
        vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 0.0, 1.0),
        ],
        vec![[0, 2, 1], [0, 1, 3]],
    ))
    .unwrap()
}

/// Distance from `p` to the closest point on `mesh`
fn distance_to_surface(mesh: &MeshSurface, p: &Point3d) -> f64 {
    let world = mesh.mesh_to_world().transform_point(p);
    let hit = mesh.nearest_face_to_point(&world).unwrap();
    (hit.point - world).norm()
}

fn linear_curve(mesh: &MeshSurface, resolution: f64) -> SurfaceCurve {
    let config = CurveConfig {
        resolution,
        project_to_mesh: false,
        ..CurveConfig::default()
    };
    SurfaceCurve::with_config(mesh, config).unwrap()
}

/// A mesh with quad faces, which curves cannot be bound to
struct QuadMesh;

impl SurfaceMesh for QuadMesh {
    fn is_triangular(&self) -> bool {
        false
    }
    fn num_faces(&self) -> usize {
        1
    }
    fn face_world_vertices(&self, _face: usize) -> Option<[Point3d; 3]> {
        None
    }
    fn nearest_face_to_point(&self, _point: &Point3d) -> Option<FaceHit> {
        None
    }
    fn nearest_face_along_line(
        &self,
        _origin: &Point3d,
        _direction: &Vector3d,
        _t_min: f64,
        _t_max: f64,
    ) -> Option<FaceHit> {
        None
    }
    fn estimate_surface_normal(&self, _point: &Point3d, _face: usize, _radius: f64) -> Vector3d {
        Vector3d::z()
    }
    fn mesh_to_world(&self) -> Transform3D {
        Transform3D::identity()
    }
    fn radius(&self) -> f64 {
        1.0
    }
}

#[test]
fn test_non_triangular_mesh_is_rejected() {
    let mesh = QuadMesh;
    let err = SurfaceCurve::new(&mesh).unwrap_err();
    assert!(matches!(err, Error::InvalidMesh(_)));
    assert!(err.to_string().contains("triangulated surface"));
    assert!(matches!(
        Marker::from_barycentric(&mesh, 0, 0.2, 0.2, 0.0),
        Err(Error::InvalidMesh(_))
    ));
    assert!(Marker::from_point(&mesh, &Point3d::origin(), 0.0).is_err());
}

#[test]
fn test_unit_square_example() {
    let mesh = unit_square();
    let mut curve = linear_curve(&mesh, 0.5);
    curve.add_marker(&mesh, &Point3d::new(0.0, 0.0, 0.0)).unwrap();
    curve.add_marker(&mesh, &Point3d::new(1.0, 0.0, 0.0)).unwrap();

    let points = curve.points(&mesh).to_vec();
    assert_eq!(points.len(), 3);
    let expected = [
        Point3d::new(0.0, 0.0, 0.0),
        Point3d::new(0.5, 0.0, 0.0),
        Point3d::new(1.0, 0.0, 0.0),
    ];
    for (got, want) in points.iter().zip(expected.iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-12);
    }
    for n in curve.normals(&mesh) {
        assert_relative_eq!(*n, Vector3d::z(), epsilon = 1e-12);
    }
}

#[test]
fn test_repeated_reads_hit_the_cache() {
    let mesh = unit_square();
    let mut curve = SurfaceCurve::new(&mesh).unwrap();
    curve.set_resolution(&mesh, 0.1);
    curve.add_marker(&mesh, &Point3d::new(0.1, 0.2, 0.0)).unwrap();
    curve.add_marker(&mesh, &Point3d::new(0.8, 0.7, 0.0)).unwrap();
    assert_eq!(curve.recompute_count(), 0);

    let first = curve.points(&mesh).to_vec();
    for _ in 0..5 {
        assert_eq!(curve.points(&mesh), first.as_slice());
        curve.normals(&mesh);
        curve.num_points(&mesh);
        curve.tangent(&mesh, 1);
        curve.find_nearest_point(&mesh, &Point3d::new(0.5, 0.5, 0.0), 0.0);
    }
    assert_eq!(curve.recompute_count(), 1);

    curve.invalidate();
    curve.num_points(&mesh);
    assert_eq!(curve.recompute_count(), 2);
}

#[test]
fn test_default_resolution() {
    let mesh = unit_square();
    let expected = 0.5 * 2.0f64.sqrt() / 100.0;
    let mut curve = SurfaceCurve::new(&mesh).unwrap();
    curve.set_resolution(&mesh, 0.3);
    assert_relative_eq!(curve.resolution(), 0.3);
    curve.set_resolution(&mesh, -2.0);
    assert_relative_eq!(curve.resolution(), expected);
    curve.set_resolution(&mesh, 0.0);
    assert_relative_eq!(curve.resolution(), expected);
}

#[test]
fn test_linear_point_count_and_collinearity() {
    let mesh = unit_square();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..25 {
        let resolution = rng.gen_range(0.01..0.3);
        let mut curve = linear_curve(&mesh, resolution);
        let a = curve
            .add_marker(&mesh, &Point3d::new(rng.gen(), rng.gen(), 0.0))
            .unwrap();
        let b = curve
            .add_marker(&mesh, &Point3d::new(rng.gen(), rng.gen(), 0.0))
            .unwrap();
        let pa = curve.marker(a).unwrap().position();
        let pb = curve.marker(b).unwrap().position();
        let d = (pb - pa).norm();

        let expected = (d / resolution).ceil() as usize + 1;
        assert_eq!(curve.num_points(&mesh), expected);

        let dir = (pb - pa) / d;
        for p in curve.points(&mesh) {
            let offset = p - pa;
            assert!(offset.cross(&dir).norm() < 1e-12);
            let along = offset.dot(&dir);
            assert!(along >= -1e-12 && along <= d + 1e-12);
        }
    }
}

#[test]
fn test_fewer_than_two_markers() {
    let mesh = unit_square();
    let mut curve = SurfaceCurve::new(&mesh).unwrap();
    assert_eq!(curve.num_points(&mesh), 0);
    curve.add_marker(&mesh, &Point3d::new(0.5, 0.5, 0.0)).unwrap();
    assert_eq!(curve.num_points(&mesh), 0);
    assert!(curve.points(&mesh).is_empty());
    assert!(curve.normals(&mesh).is_empty());
    assert_eq!(curve.point(&mesh, 0), None);
    assert_eq!(curve.tangent(&mesh, 0), Vector3d::zeros());
    assert!(curve
        .find_point_at_distance(&mesh, &Point3d::origin(), 0.1, 0.0)
        .is_none());
    assert_eq!(
        curve.find_nearest_point(&mesh, &Point3d::new(0.3, 0.3, 0.0), 0.0),
        (0.0, Point3d::origin())
    );
    assert!(curve.lines(&mesh).is_empty());
}

#[test]
fn test_closed_triangle_path() {
    let mesh = unit_square();
    let mut curve = linear_curve(&mesh, 0.3);
    curve.set_closed(true);
    let ids = [
        curve.add_marker(&mesh, &Point3d::new(0.1, 0.1, 0.0)).unwrap(),
        curve.add_marker(&mesh, &Point3d::new(0.9, 0.1, 0.0)).unwrap(),
        curve.add_marker(&mesh, &Point3d::new(0.1, 0.9, 0.0)).unwrap(),
    ];

    // 3 + 4 + 3 subdivisions over three intervals
    assert_eq!(curve.num_points(&mesh), 10);
    let indices: Vec<usize> = ids
        .iter()
        .map(|id| curve.marker(*id).unwrap().curve_point_index().unwrap())
        .collect();
    assert_eq!(indices, vec![0, 3, 7]);

    // The third interval runs from marker 2 back to marker 0 along x = 0.1
    let points = curve.points(&mesh).to_vec();
    for p in &points[7..] {
        assert_relative_eq!(p.x, 0.1, epsilon = 1e-12);
    }
    assert!(points[8].y < points[7].y && points[9].y < points[8].y);

    // Only the wrap segment from the last sample back to marker 0 is within
    // reach, and the start location is ignored on closed curves
    let p0 = Point3d::new(0.0, 0.25, 0.0);
    let from_start = curve.find_point_at_distance(&mesh, &p0, 0.15, 0.0);
    let from_later = curve.find_point_at_distance(&mesh, &p0, 0.15, 5.5);
    assert!(from_start.is_some());
    assert_eq!(from_start, from_later);
    let (r, p) = from_start.unwrap();
    assert!(r > 9.0 && r < 10.0);
    assert_relative_eq!(p.x, 0.1, epsilon = 1e-12);
    assert_relative_eq!(p.y, 0.25 + 0.0125f64.sqrt(), epsilon = 1e-9);

    let lines = curve.lines(&mesh);
    assert_eq!(lines.num_lines(), 10);
    assert_eq!(lines.lines.last(), Some(&[9, 0]));
}

#[test]
fn test_nearest_point_matches_segment_projection() {
    let mesh = unit_square();
    let mut curve = linear_curve(&mesh, 10.0);
    let a = curve.add_marker(&mesh, &Point3d::new(0.2, 0.3, 0.0)).unwrap();
    let b = curve.add_marker(&mesh, &Point3d::new(0.8, 0.6, 0.0)).unwrap();
    assert_eq!(curve.num_points(&mesh), 2);

    let pa = curve.marker(a).unwrap().position();
    let pb = curve.marker(b).unwrap().position();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let p0 = Point3d::new(rng.gen_range(-0.5..1.5), rng.gen_range(-0.5..1.5), rng.gen_range(-0.5..0.5));
        let d = pb - pa;
        let t = ((p0 - pa).dot(&d) / d.norm_squared()).clamp(0.0, 1.0);
        let (r, p) = curve.find_nearest_point(&mesh, &p0, 0.0);
        assert_relative_eq!(r, t, epsilon = 1e-12);
        assert_relative_eq!(p, pa + d * t, epsilon = 1e-12);
    }
}

#[test]
fn test_moving_a_marker_invalidates() {
    let mesh = unit_square();
    let mut curve = linear_curve(&mesh, 0.25);
    curve.add_marker(&mesh, &Point3d::new(0.1, 0.1, 0.0)).unwrap();
    let b = curve.add_marker(&mesh, &Point3d::new(0.9, 0.1, 0.0)).unwrap();
    let before = curve.points(&mesh).to_vec();

    assert!(curve.set_marker_position(&mesh, b, &Point3d::new(0.9, 0.9, 0.0)));
    assert!(!curve.is_valid());
    let after = curve.points(&mesh).to_vec();
    assert_ne!(before, after);
    assert_relative_eq!(*after.last().unwrap(), Point3d::new(0.9, 0.9, 0.0), epsilon = 1e-12);
}

#[test]
fn test_stale_marker_degrades_to_origin() {
    let mesh = unit_square();
    let mut curve = linear_curve(&mesh, 0.5);
    curve.add_marker_at(&mesh, 0, 0.5, 0.0).unwrap();
    let stale = curve.add_marker_at(&mesh, 1, 0.25, 0.25).unwrap();

    let shrunk = MeshSurface::new(TriangleMesh::from_vertices_and_faces(
        mesh.mesh().vertices.clone(),
        vec![[0, 1, 2]],
    ))
    .unwrap();
    curve.update_marker_positions(&shrunk);
    assert_eq!(curve.marker(stale).unwrap().position(), Point3d::origin());

    let points = curve.points(&shrunk).to_vec();
    assert_eq!(*points.last().unwrap(), Point3d::origin());
}

#[test]
fn test_projection_keeps_samples_on_curved_surface() {
    let mesh = ridge();
    for mode in Interpolation::ALL {
        let mut curve = SurfaceCurve::with_config(
            &mesh,
            CurveConfig {
                resolution: 0.02,
                interpolation: mode,
                project_to_mesh: true,
                ..CurveConfig::default()
            },
        )
        .unwrap();
        curve.add_marker(&mesh, &on_ridge(0.1, 0.2)).unwrap();
        curve.add_marker(&mesh, &on_ridge(0.5, 0.5)).unwrap();
        curve.add_marker(&mesh, &on_ridge(0.9, 0.4)).unwrap();

        assert!(curve.num_points(&mesh) > 40);
        let points = curve.points(&mesh).to_vec();
        for p in &points {
            assert!(distance_to_surface(&mesh, p) < 1e-9, "{mode} left the surface at {p:?}");
        }
        for n in curve.normals(&mesh) {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
            assert!(n.z > 0.0);
        }
    }
}

#[test]
fn test_unprojected_linear_curve_cuts_under_ridge() {
    let mesh = ridge();
    let mut curve = linear_curve(&mesh, 0.05);
    curve.add_marker(&mesh, &on_ridge(0.1, 0.5)).unwrap();
    curve.add_marker(&mesh, &on_ridge(0.9, 0.5)).unwrap();
    let points = curve.points(&mesh).to_vec();
    let mid = points[points.len() / 2];
    assert!(distance_to_surface(&mesh, &mid) > 0.05);

    curve.set_project_to_mesh(true);
    let mid = curve.point(&mesh, points.len() / 2).unwrap();
    assert!(distance_to_surface(&mesh, &mid) < 1e-9);
}

#[test]
fn test_zero_normal_radius_uses_face_normals() {
    let mesh = folded();
    let config = CurveConfig {
        resolution: 0.1,
        normal_compute_radius: 0.0,
        ..CurveConfig::default()
    };
    let mut curve = SurfaceCurve::with_config(&mesh, config).unwrap();
    assert_eq!(curve.normal_compute_radius(), 0.0);

    // Both markers on face 0, one within the default radius of the fold
    let near_fold = curve.add_marker_at(&mesh, 0, 0.005, 0.005).unwrap();
    curve.add_marker_at(&mesh, 0, 0.5, 0.3).unwrap();
    assert!(curve.num_points(&mesh) > 2);
    for n in curve.normals(&mesh) {
        assert_relative_eq!(*n, Vector3d::z(), epsilon = 1e-12);
    }
    assert_relative_eq!(
        curve.marker(near_fold).unwrap().cached_normal().unwrap(),
        Vector3d::z(),
        epsilon = 1e-12
    );

    let mut side = Marker::from_barycentric(&mesh, 1, 0.3, 0.3, curve.normal_compute_radius()).unwrap();
    assert_relative_eq!(side.normal(&mesh), Vector3d::x(), epsilon = 1e-12);

    // A default radius blends in the vertex normals at the fold
    curve.set_normal_compute_radius(&mesh, -1.0);
    assert!(curve.normal_compute_radius() > 0.0);
    curve.ensure_valid(&mesh);
    let blended = curve.marker(near_fold).unwrap().cached_normal().unwrap();
    assert!(blended.x > 1e-3);

    curve.set_normal_compute_radius(&mesh, 0.0);
    assert_eq!(curve.normal_compute_radius(), 0.0);
    assert!(!curve.is_valid());
    assert_relative_eq!(curve.normal(&mesh, 0).unwrap(), Vector3d::z(), epsilon = 1e-12);
}

#[test]
fn test_rigid_motion_keeps_local_samples() {
    let mut mesh = ridge();
    let mut curve = SurfaceCurve::new(&mesh).unwrap();
    curve.set_resolution(&mesh, 0.05);
    curve.set_interpolation(Interpolation::NaturalSpline);
    curve.add_marker(&mesh, &Point3d::new(0.2, 0.2, 0.5)).unwrap();
    curve.add_marker(&mesh, &Point3d::new(0.7, 0.4, 0.5)).unwrap();
    curve.add_marker(&mesh, &Point3d::new(0.4, 0.8, 0.5)).unwrap();
    let local = curve.points(&mesh).to_vec();

    let motion = Transform3D::from_translation_rotation(
        Vector3d::new(3.0, -1.0, 2.0),
        UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1),
    );
    mesh.set_mesh_to_world(motion).unwrap();

    // Cached samples are unaffected, world positions follow the mesh
    assert_eq!(curve.points(&mesh), local.as_slice());
    assert_eq!(curve.recompute_count(), 1);
    let world = curve.world_points(&mesh);
    assert_relative_eq!(world[0], motion.transform_point(&local[0]), epsilon = 1e-12);

    // Resampling after the move reproduces the same local curve
    curve.update_marker_positions(&mesh);
    let resampled = curve.points(&mesh).to_vec();
    assert_eq!(resampled.len(), local.len());
    for (a, b) in resampled.iter().zip(&local) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn test_spline_curves_pass_markers() {
    let mesh = unit_square();
    let positions = [
        Point3d::new(0.1, 0.1, 0.0),
        Point3d::new(0.8, 0.2, 0.0),
        Point3d::new(0.7, 0.8, 0.0),
        Point3d::new(0.2, 0.6, 0.0),
    ];
    for mode in [Interpolation::BSpline, Interpolation::NaturalSpline] {
        for closed in [false, true] {
            let mut curve = linear_curve(&mesh, 0.05);
            curve.set_interpolation(mode);
            curve.set_closed(closed);
            let ids: Vec<MarkerId> = positions
                .iter()
                .map(|p| curve.add_marker(&mesh, p).unwrap())
                .collect();
            curve.ensure_valid(&mesh);
            for (id, p) in ids.iter().zip(&positions) {
                let k = curve.marker(*id).unwrap().curve_point_index().unwrap();
                assert_relative_eq!(curve.point(&mesh, k).unwrap(), *p, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_curve_state_round_trip_keeps_samples() {
    let mesh = ridge();
    let mut curve = SurfaceCurve::new(&mesh).unwrap();
    curve.set_interpolation(Interpolation::BSpline);
    curve.set_closed(true);
    curve.set_normal_length(0.05);
    curve.add_marker(&mesh, &Point3d::new(0.2, 0.2, 0.5)).unwrap();
    curve.add_marker(&mesh, &Point3d::new(0.8, 0.3, 0.5)).unwrap();
    curve.add_marker(&mesh, &Point3d::new(0.5, 0.8, 0.5)).unwrap();

    let mut restored = SurfaceCurve::from_state(&mesh, &curve.state()).unwrap();
    assert_eq!(restored.config(), curve.config());
    assert_eq!(restored.points(&mesh), curve.points(&mesh));

    let lines = restored.lines(&mesh);
    assert_eq!(lines.normal_arrows.map(|a| a.len()), Some(lines.vertices.len()));
}
