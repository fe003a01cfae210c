//! Screen-space picking of edges and vertices on a projected mesh.
//!
//! Faces are scanned in index order and edges in face-local order; the first
//! candidate inside the pixel threshold wins, so ties always resolve the same way.

use bevy::prelude::*;

use super::edge::PositionEdge;
use super::projection::Projection;
use crate::modeling::poly_mesh::{FaceIndex, PolyMesh, VertexIndex};

/// Result of an edge pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    pub face: FaceIndex,
    /// Face-local edge index.
    pub edge: usize,
    /// Parameter along the face-local edge direction.
    pub t: f32,
    /// World position of the cut point.
    pub position: Vec3,
    /// Screen position of the cut point.
    pub screen: Vec2,
    pub screen_distance: f32,
}

/// Result of a vertex pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexHit {
    pub face: FaceIndex,
    /// Face-local corner index.
    pub corner: usize,
    pub vertex: VertexIndex,
    pub position: Vec3,
    pub screen_distance: f32,
}

/// Pixel thresholds for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickThresholds {
    pub edge_px: f32,
    pub vertex_px: f32,
}

impl Default for PickThresholds {
    fn default() -> Self {
        Self {
            edge_px: 12.0,
            vertex_px: 8.0,
        }
    }
}

/// Pick the first edge of any face within `thresholds.edge_px` of the cursor.
pub fn pick_edge(
    mesh: &PolyMesh,
    projection: &impl Projection,
    cursor: Vec2,
    thresholds: PickThresholds,
) -> Option<EdgeHit> {
    (0..mesh.face_count())
        .find_map(|face| pick_edge_on_face(mesh, face, projection, cursor, thresholds, None))
}

/// Pick the first edge of `face` within threshold, optionally skipping one edge.
pub fn pick_edge_on_face(
    mesh: &PolyMesh,
    face: FaceIndex,
    projection: &impl Projection,
    cursor: Vec2,
    thresholds: PickThresholds,
    exclude_edge: Option<usize>,
) -> Option<EdgeHit> {
    let n = mesh.face(face)?.len();
    if n < 2 {
        return None;
    }
    // A two-vertex line has a single edge.
    let edge_count = if n == 2 { 1 } else { n };

    (0..edge_count)
        .filter(|&edge| Some(edge) != exclude_edge)
        .find_map(|edge| {
            let world = mesh.edge_positions(face, edge)?;
            if world.is_degenerate() {
                return None;
            }
            let s0 = projection.world_to_screen(world.a)?;
            let s1 = projection.world_to_screen(world.b)?;
            if s0.distance_squared(s1) < 1e-6 {
                return None;
            }

            let (dist, t) = point_to_segment(cursor, s0, s1);
            if dist > thresholds.edge_px {
                return None;
            }

            let (t, position, screen) = snap_to_endpoint(&world, s0, s1, cursor, t, thresholds);
            Some(EdgeHit {
                face,
                edge,
                t,
                position,
                screen,
                screen_distance: dist,
            })
        })
}

/// Snap the cut to an edge endpoint when the cursor is within the vertex radius.
fn snap_to_endpoint(
    world: &PositionEdge,
    s0: Vec2,
    s1: Vec2,
    cursor: Vec2,
    t: f32,
    thresholds: PickThresholds,
) -> (f32, Vec3, Vec2) {
    if cursor.distance(s0) <= thresholds.vertex_px {
        (0.0, world.a, s0)
    } else if cursor.distance(s1) <= thresholds.vertex_px {
        (1.0, world.b, s1)
    } else {
        (t, world.point_at(t), s0.lerp(s1, t))
    }
}

/// Pick the first face corner within `thresholds.vertex_px` of the cursor.
pub fn pick_vertex(
    mesh: &PolyMesh,
    projection: &impl Projection,
    cursor: Vec2,
    thresholds: PickThresholds,
) -> Option<VertexHit> {
    mesh.faces.iter().enumerate().find_map(|(face, f)| {
        f.vertices.iter().enumerate().find_map(|(corner, &vertex)| {
            let position = mesh.position(vertex)?;
            let screen = projection.world_to_screen(position)?;
            let dist = screen.distance(cursor);
            (dist <= thresholds.vertex_px).then_some(VertexHit {
                face,
                corner,
                vertex,
                position,
                screen_distance: dist,
            })
        })
    })
}

/// Distance from a point to a 2D segment and the parameter of the closest point.
pub fn point_to_segment(point: Vec2, seg_a: Vec2, seg_b: Vec2) -> (f32, f32) {
    let ab = seg_b - seg_a;
    let ap = point - seg_a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-10 {
        return (ap.length(), 0.5);
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    (point.distance(seg_a + ab * t), t)
}

/// 2D cross product (z-component of 3D cross).
fn cross_2d(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Intersect the infinite line through `line_a`/`line_b` with segment `seg_a`–`seg_b`.
///
/// Returns the parameter along the segment, or `None` when the line misses it
/// or is parallel to it.
pub fn line_segment_intersection(line_a: Vec2, line_b: Vec2, seg_a: Vec2, seg_b: Vec2) -> Option<f32> {
    let dir = line_b - line_a;
    let seg = seg_b - seg_a;
    let denom = cross_2d(dir, seg);
    if denom.abs() < 1e-9 || dir.length_squared() < 1e-10 {
        return None;
    }
    let u = cross_2d(line_a - seg_a, dir) / -denom;
    (0.0..=1.0).contains(&u).then_some(u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modeling::knife::projection::TopDownProjection;
    use crate::modeling::knife::test_fixtures::make_two_quads;

    const PROJ: TopDownProjection = TopDownProjection {
        pixels_per_unit: 100.0,
    };

    #[test]
    fn picks_bottom_edge_midpoint() {
        let mesh = make_two_quads();
        let hit = pick_edge(&mesh, &PROJ, Vec2::new(50.0, 3.0), PickThresholds::default())
            .expect("edge hit");
        assert_eq!((hit.face, hit.edge), (0, 0));
        assert!((hit.t - 0.5).abs() < 1e-5);
        assert!((hit.position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn shared_edge_resolves_to_lowest_face() {
        let mesh = make_two_quads();
        let hit = pick_edge(&mesh, &PROJ, Vec2::new(101.0, -50.0), PickThresholds::default())
            .expect("edge hit");
        assert_eq!((hit.face, hit.edge), (0, 1));
    }

    #[test]
    fn nothing_outside_threshold() {
        let mesh = make_two_quads();
        assert!(pick_edge(&mesh, &PROJ, Vec2::new(50.0, -50.0), PickThresholds::default()).is_none());
    }

    #[test]
    fn excluded_edge_is_skipped() {
        let mesh = make_two_quads();
        let hit = pick_edge_on_face(
            &mesh,
            0,
            &PROJ,
            Vec2::new(50.0, 3.0),
            PickThresholds::default(),
            Some(0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn cursor_near_corner_snaps_to_vertex() {
        let mesh = make_two_quads();
        let hit = pick_edge(&mesh, &PROJ, Vec2::new(4.0, 2.0), PickThresholds::default())
            .expect("edge hit");
        assert_eq!(hit.t, 0.0);
        assert_eq!(hit.position, Vec3::ZERO);
    }

    #[test]
    fn pick_vertex_uses_smaller_radius() {
        let mesh = make_two_quads();
        let thresholds = PickThresholds::default();
        assert!(pick_vertex(&mesh, &PROJ, Vec2::new(10.0, 0.0), thresholds).is_none());
        let hit = pick_vertex(&mesh, &PROJ, Vec2::new(99.0, -99.0), thresholds).expect("vertex");
        assert_eq!(hit.vertex, 2);
    }

    #[test]
    fn line_crosses_segment() {
        let u = line_segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(4.0, 2.0),
        );
        assert!((u.expect("crosses") - 0.5).abs() < 1e-6);
        assert!(
            line_segment_intersection(Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::new(1.0, 1.0)).is_none()
        );
    }
}
