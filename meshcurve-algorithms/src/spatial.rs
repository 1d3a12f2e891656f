//! Spatial indexes over mesh vertices and faces
//!
//! Both indexes are R*-trees built in the mesh-local frame. The vertex index
//! answers radius queries for normal estimation; the face index answers
//! nearest-face and line-crossing queries for marker placement and projection.

use crate::geometry::{closest_point_on_triangle, line_triangle_intersect};
use meshcurve_core::{FaceHit, NearestNeighborSearch, Point3d, TriangleMesh, Vector3d};
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree, RTreeObject, SelectionFunction, AABB};

/// Padding applied to boxes in line queries so flat triangles are not skipped
const BOX_PADDING: f64 = 1e-9;

type IndexedVertex = GeomWithData<[f64; 3], usize>;

fn to_array(p: &Point3d) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// R*-tree over vertex positions
pub struct VertexIndex {
    tree: RTree<IndexedVertex>,
}

impl VertexIndex {
    pub fn new(points: &[Point3d]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedVertex::new(to_array(p), i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl NearestNeighborSearch for VertexIndex {
    fn find_nearest(&self, query: &Point3d) -> Option<(usize, f64)> {
        let q = to_array(query);
        self.tree
            .nearest_neighbor(&q)
            .map(|v| (v.data, v.distance_2(&q).sqrt()))
    }

    fn find_radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<(usize, f64)> {
        if radius < 0.0 {
            return Vec::new();
        }
        let q = to_array(query);
        self.tree
            .locate_within_distance(q, radius * radius)
            .map(|v| (v.data, v.distance_2(&q).sqrt()))
            .collect()
    }
}

/// A mesh face stored with its corner positions
#[derive(Debug, Clone)]
struct IndexedTriangle {
    face: usize,
    corners: [Point3d; 3],
}

impl IndexedTriangle {
    fn closest_point(&self, point: &Point3d) -> (Point3d, (f64, f64)) {
        let [a, b, c] = &self.corners;
        closest_point_on_triangle(point, a, b, c)
    }
}

impl RTreeObject for IndexedTriangle {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let [a, b, c] = &self.corners;
        let min = a.inf(b).inf(c);
        let max = a.sup(b).sup(c);
        AABB::from_corners(to_array(&min), to_array(&max))
    }
}

impl PointDistance for IndexedTriangle {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let p = Point3d::new(point[0], point[1], point[2]);
        let (q, _) = self.closest_point(&p);
        (p - q).norm_squared()
    }
}

/// Selects tree nodes whose boxes are crossed by a line segment `[t_min, t_max]`
struct LineSelection {
    origin: Point3d,
    dir: Vector3d,
    t_min: f64,
    t_max: f64,
}

impl LineSelection {
    /// Slab test; infinite parameter bounds are allowed
    fn crosses(&self, envelope: &AABB<[f64; 3]>) -> bool {
        let lo = envelope.lower();
        let hi = envelope.upper();
        let mut t0 = self.t_min;
        let mut t1 = self.t_max;
        for axis in 0..3 {
            let l = lo[axis] - BOX_PADDING;
            let h = hi[axis] + BOX_PADDING;
            let o = self.origin[axis];
            let d = self.dir[axis];
            if d == 0.0 {
                if o < l || o > h {
                    return false;
                }
                continue;
            }
            let (mut ta, mut tb) = ((l - o) / d, (h - o) / d);
            if ta > tb {
                std::mem::swap(&mut ta, &mut tb);
            }
            t0 = t0.max(ta);
            t1 = t1.min(tb);
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

impl SelectionFunction<IndexedTriangle> for LineSelection {
    fn should_unpack_parent(&self, envelope: &AABB<[f64; 3]>) -> bool {
        self.crosses(envelope)
    }

    fn should_unpack_leaf(&self, leaf: &IndexedTriangle) -> bool {
        self.crosses(&leaf.envelope())
    }
}

/// R*-tree over triangle bounding boxes
pub struct FaceIndex {
    tree: RTree<IndexedTriangle>,
}

impl FaceIndex {
    /// Build the index; the mesh is expected to have passed validation
    pub fn new(mesh: &TriangleMesh) -> Self {
        let entries = (0..mesh.face_count())
            .filter_map(|face| {
                mesh.face_vertices(face)
                    .map(|corners| IndexedTriangle { face, corners })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest face to a point, with the closest point and its barycentrics
    pub fn nearest_face(&self, point: &Point3d) -> Option<FaceHit> {
        let nearest = self.tree.nearest_neighbor(&to_array(point))?;
        let (closest, barycentric) = nearest.closest_point(point);
        Some(FaceHit {
            face: nearest.face,
            point: closest,
            barycentric,
        })
    }

    /// Face crossed by `origin + t * dir` with the smallest `|t|` in `[t_min, t_max]`
    ///
    /// Ties are broken towards the lower face index so that lines through a
    /// shared edge resolve deterministically.
    pub fn nearest_face_along_line(
        &self,
        origin: &Point3d,
        dir: &Vector3d,
        t_min: f64,
        t_max: f64,
    ) -> Option<FaceHit> {
        if dir.norm_squared() == 0.0 || t_min > t_max {
            return None;
        }
        let selection = LineSelection {
            origin: *origin,
            dir: *dir,
            t_min,
            t_max,
        };
        let mut best: Option<(f64, FaceHit)> = None;
        for tri in self.tree.locate_with_selection_function(selection) {
            let [a, b, c] = &tri.corners;
            let Some((t, s1, s2)) = line_triangle_intersect(origin, dir, a, b, c) else {
                continue;
            };
            if t < t_min || t > t_max {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_t, hit)) => {
                    t.abs() < best_t.abs() || (t.abs() == best_t.abs() && tri.face < hit.face)
                }
            };
            if better {
                best = Some((
                    t,
                    FaceHit {
                        face: tri.face,
                        point: origin + dir * t,
                        barycentric: (s1, s2),
                    },
                ));
            }
        }
        best.map(|(_, hit)| hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// A two-level terrace: the unit square at z=0 and a second square at z=1 above x in [2,3]
    fn terrace() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(1.0, 1.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
                Point3d::new(2.0, 0.0, 1.0),
                Point3d::new(3.0, 0.0, 1.0),
                Point3d::new(3.0, 1.0, 1.0),
                Point3d::new(2.0, 1.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]],
        )
    }

    #[test]
    fn test_radius_neighbors_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<Point3d> = (0..200)
            .map(|_| Point3d::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        let index = VertexIndex::new(&points);
        assert_eq!(index.len(), 200);

        for _ in 0..20 {
            let q = Point3d::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let mut found: Vec<usize> = index.find_radius_neighbors(&q, 0.4).into_iter().map(|(i, _)| i).collect();
            found.sort_unstable();
            let expected: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| (*p - q).norm() <= 0.4)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn test_nearest_vertex() {
        let points = vec![Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 0.0, 0.0)];
        let index = VertexIndex::new(&points);
        let (i, d) = index.find_nearest(&Point3d::new(0.9, 0.0, 0.0)).unwrap();
        assert_eq!(i, 1);
        assert_relative_eq!(d, 0.1, epsilon = 1e-12);
        assert!(VertexIndex::new(&[]).find_nearest(&Point3d::origin()).is_none());
    }

    #[test]
    fn test_nearest_face_to_point() {
        let index = FaceIndex::new(&terrace());
        assert_eq!(index.len(), 4);
        let hit = index.nearest_face(&Point3d::new(2.8, 0.2, 1.5)).unwrap();
        assert_eq!(hit.face, 2);
        assert_relative_eq!(hit.point, Point3d::new(2.8, 0.2, 1.0), epsilon = 1e-12);
        assert_relative_eq!(hit.s0() + hit.barycentric.0 + hit.barycentric.1, 1.0);
    }

    #[test]
    fn test_line_query_prefers_smallest_parameter_magnitude() {
        let index = FaceIndex::new(&terrace());
        let down = Vector3d::new(0.0, 0.0, -1.0);

        // Above the lower square: hit is at t = 0.25 ahead
        let hit = index
            .nearest_face_along_line(&Point3d::new(0.7, 0.2, 0.25), &down, f64::NEG_INFINITY, f64::INFINITY)
            .unwrap();
        assert_eq!(hit.face, 0);
        assert_relative_eq!(hit.point, Point3d::new(0.7, 0.2, 0.0), epsilon = 1e-12);

        // Below the upper square: the line reaches it only behind the origin
        let hit = index
            .nearest_face_along_line(&Point3d::new(2.5, 0.8, 0.5), &down, f64::NEG_INFINITY, f64::INFINITY)
            .unwrap();
        assert!(hit.face == 2 || hit.face == 3);
        assert_relative_eq!(hit.point.z, 1.0, epsilon = 1e-12);

        // Restricting to forward hits finds nothing there
        assert!(index
            .nearest_face_along_line(&Point3d::new(2.5, 0.8, 0.5), &down, 0.0, f64::INFINITY)
            .is_none());
    }

    #[test]
    fn test_line_through_shared_edge_is_deterministic() {
        let index = FaceIndex::new(&terrace());
        let query = || {
            index
                .nearest_face_along_line(
                    &Point3d::new(0.5, 0.5, 1.0),
                    &Vector3d::new(0.0, 0.0, 1.0),
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                )
                .unwrap()
        };
        let first = query();
        assert!(first.face == 0 || first.face == 1);
        assert_relative_eq!(first.point, Point3d::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        for _ in 0..5 {
            assert_eq!(query().face, first.face);
        }
    }
}
