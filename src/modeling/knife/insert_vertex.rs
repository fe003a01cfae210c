//! Insert a vertex on an edge without splitting any face.
//!
//! Every face that has the edge (matched by position) gets the new vertex
//! spliced into its loop between the edge's endpoints, so neighbours stay
//! connected.

use bevy::prelude::*;

use super::edge::PositionEdge;
use super::vertex_cache::VertexCache;
use crate::modeling::poly_mesh::{FaceIndex, PolyMesh};

/// Insert a vertex at `position` on `edge` into every face containing the edge.
///
/// Returns the number of faces modified. Nothing happens when `position`
/// coincides with one of the edge's endpoints or no face has the edge.
pub fn insert_vertex_on_edge(
    mesh: &mut PolyMesh,
    edge: &PositionEdge,
    position: Vec3,
    cache: &mut VertexCache,
    epsilon: f32,
) -> usize {
    if edge.is_degenerate() || edge.a.distance(position) <= epsilon || edge.b.distance(position) <= epsilon {
        return 0;
    }

    let mut targets: Vec<(FaceIndex, usize)> = (0..mesh.face_count())
        .filter_map(|face| mesh.find_edge(face, edge, epsilon).map(|local| (face, local)))
        .collect();
    if targets.is_empty() {
        debug!("No face has the edge to insert into");
        return 0;
    }
    targets.sort_by(|a, b| b.0.cmp(&a.0));

    let vertex = cache.resolve(mesh, position, edge);
    let mut modified = 0;
    for (face, local) in targets {
        let Some(f) = mesh.faces.get_mut(face) else {
            continue;
        };
        if f.vertices.contains(&vertex) {
            continue;
        }
        f.vertices.insert(local + 1, vertex);
        modified += 1;
    }
    modified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modeling::knife::edge::POSITION_EPSILON;
    use crate::modeling::knife::test_fixtures::{make_two_quads, shared_edge};

    #[test]
    fn shared_edge_gets_vertex_in_both_faces() {
        let mut mesh = make_two_quads();
        let mut cache = VertexCache::default();
        let modified = insert_vertex_on_edge(
            &mut mesh,
            &shared_edge(),
            Vec3::new(1.0, 0.5, 0.0),
            &mut cache,
            POSITION_EPSILON,
        );
        assert_eq!(modified, 2);
        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces[0].vertices, vec![0, 1, 6, 2, 3]);
        assert_eq!(mesh.faces[1].vertices, vec![1, 4, 5, 2, 6]);
    }

    #[test]
    fn boundary_edge_touches_one_face() {
        let mut mesh = make_two_quads();
        let mut cache = VertexCache::default();
        let bottom = PositionEdge::new(Vec3::ZERO, Vec3::X);
        let modified = insert_vertex_on_edge(
            &mut mesh,
            &bottom,
            Vec3::new(0.25, 0.0, 0.0),
            &mut cache,
            POSITION_EPSILON,
        );
        assert_eq!(modified, 1);
        assert_eq!(mesh.faces[0].vertices, vec![0, 6, 1, 2, 3]);
        assert_eq!(mesh.faces[1].vertices, vec![1, 4, 5, 2]);
    }

    #[test]
    fn endpoint_position_is_a_no_op() {
        let mut mesh = make_two_quads();
        let original = mesh.clone();
        let mut cache = VertexCache::default();
        let modified = insert_vertex_on_edge(
            &mut mesh,
            &shared_edge(),
            Vec3::new(1.0, 1.0, 0.0),
            &mut cache,
            POSITION_EPSILON,
        );
        assert_eq!(modified, 0);
        assert_eq!(mesh, original);
    }

    #[test]
    fn missing_edge_creates_nothing() {
        let mut mesh = make_two_quads();
        let mut cache = VertexCache::default();
        let stray = PositionEdge::new(Vec3::splat(4.0), Vec3::splat(5.0));
        let modified = insert_vertex_on_edge(&mut mesh, &stray, Vec3::splat(4.5), &mut cache, POSITION_EPSILON);
        assert_eq!(modified, 0);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(cache.created(), 0);
    }

    #[test]
    fn repeated_insert_reuses_the_vertex() {
        let mut mesh = make_two_quads();
        let mut cache = VertexCache::default();
        let p = Vec3::new(1.0, 0.5, 0.0);
        insert_vertex_on_edge(&mut mesh, &shared_edge(), p, &mut cache, POSITION_EPSILON);
        let again = insert_vertex_on_edge(&mut mesh, &shared_edge(), p, &mut cache, POSITION_EPSILON);
        assert_eq!(again, 0);
        assert_eq!(mesh.vertex_count(), 7);
    }
}
