//! Belt traversal: extend a single-face cut across a band of adjacent quads.
//!
//! From the seed face the walk runs twice, once out of each cut edge. Each
//! iteration finds the next unvisited face sharing the current edge (matched by
//! position), crosses to the quad's opposite edge and places the next cut point
//! with the correspondence mapper. Triangles end a direction; other non-quads
//! are skipped.

use bevy::prelude::*;
use std::collections::HashSet;

use super::correspondence::{CorrespondenceMode, map_cut};
use super::edge::{BeltStep, CutPlan, PositionEdge};
use super::projection::Projection;
use crate::modeling::poly_mesh::{FaceIndex, PolyMesh};

/// Iteration cap per direction when none is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Parameters shared by both walk directions.
#[derive(Debug, Clone, Copy)]
pub struct BeltParams {
    pub mode: CorrespondenceMode,
    pub epsilon: f32,
    pub max_iterations: usize,
}

/// Walk outward from `seed` in both directions and return the full chain,
/// seed step first.
pub fn traverse_belt(
    mesh: &PolyMesh,
    projection: &impl Projection,
    seed: BeltStep,
    params: BeltParams,
) -> CutPlan {
    let mut visited: HashSet<FaceIndex> = HashSet::from([seed.face]);
    let mut steps = vec![seed];

    walk(
        mesh,
        projection,
        seed.edge_b,
        seed.point_b,
        seed.edge_a,
        &mut visited,
        params,
        &mut steps,
    );
    walk(
        mesh,
        projection,
        seed.edge_a,
        seed.point_a,
        seed.edge_b,
        &mut visited,
        params,
        &mut steps,
    );

    CutPlan { steps }
}

/// Walk in one direction, appending steps.
fn walk(
    mesh: &PolyMesh,
    projection: &impl Projection,
    mut from: PositionEdge,
    mut from_point: Vec3,
    mut exclude: PositionEdge,
    visited: &mut HashSet<FaceIndex>,
    params: BeltParams,
    steps: &mut Vec<BeltStep>,
) {
    for _ in 0..params.max_iterations {
        let Some(next) = next_step(mesh, projection, &from, from_point, &exclude, visited, params)
        else {
            return;
        };
        visited.insert(next.face);
        steps.push(next);
        exclude = from;
        from = next.edge_b;
        from_point = next.point_b;
    }
    debug!("Belt traversal hit the iteration cap ({})", params.max_iterations);
}

/// Find the next face across `from`, or `None` when this direction ends.
fn next_step(
    mesh: &PolyMesh,
    projection: &impl Projection,
    from: &PositionEdge,
    from_point: Vec3,
    exclude: &PositionEdge,
    visited: &HashSet<FaceIndex>,
    params: BeltParams,
) -> Option<BeltStep> {
    for (face, f) in mesh.faces.iter().enumerate() {
        if visited.contains(&face) {
            continue;
        }
        let Some(matched) = mesh.find_edge(face, from, params.epsilon) else {
            continue;
        };
        if f.is_triangle() {
            return None;
        }
        if !f.is_quad() {
            continue;
        }

        let opposite_index = (matched + 2) % 4;
        let (Some(source), Some(opposite)) = (
            mesh.edge_positions(face, matched),
            mesh.edge_positions(face, opposite_index),
        ) else {
            continue;
        };
        if opposite.matches(exclude, params.epsilon) || opposite.is_degenerate() {
            continue;
        }

        let (point, _) = map_cut(params.mode, projection, &source, from_point, &opposite);
        return Some(BeltStep {
            face,
            edge_a: source,
            edge_b: opposite,
            point_a: from_point,
            point_b: point,
        });
    }
    None
}
