//! Remove an edge shared by two faces by merging them into one polygon.

use bevy::prelude::*;

use super::edge::PositionEdge;
use crate::modeling::poly_mesh::{FaceIndex, MeshFace, PolyMesh, VertexIndex};

/// Outcome of a successful erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseReport {
    /// Slot now holding the merged polygon.
    pub merged_face: FaceIndex,
    /// Slot that was removed; faces above it shifted down by one.
    pub removed_face: FaceIndex,
}

/// Merge the two faces sharing `edge`.
///
/// Returns `None`, leaving the mesh untouched, when the edge is on a boundary,
/// is shared by more than two faces, or the merged loop would be degenerate.
pub fn erase_edge(mesh: &mut PolyMesh, edge: &PositionEdge, epsilon: f32) -> Option<EraseReport> {
    let sharing: Vec<(FaceIndex, usize)> = (0..mesh.face_count())
        .filter_map(|face| mesh.find_edge(face, edge, epsilon).map(|local| (face, local)))
        .collect();
    let &[(fa, ea), (fb, eb)] = sharing.as_slice() else {
        debug!("Edge is shared by {} faces, not erasing", sharing.len());
        return None;
    };

    let merged = merge_loops(mesh, fa, ea, fb, eb, epsilon)?;
    let material = mesh.face(fa)?.material;

    mesh.faces[fa] = MeshFace::new(merged, material);
    mesh.faces.remove(fb);
    info!("Erased edge between faces {} and {}", fa, fb);
    Some(EraseReport {
        merged_face: fa,
        removed_face: fb,
    })
}

/// Loop of face `fa` without edge `ea`, continued through face `fb` without its
/// copy of the same edge.
fn merge_loops(
    mesh: &PolyMesh,
    fa: FaceIndex,
    ea: usize,
    fb: FaceIndex,
    eb: usize,
    epsilon: f32,
) -> Option<Vec<VertexIndex>> {
    let a = &mesh.face(fa)?.vertices;
    let b = &mesh.face(fb)?.vertices;
    let (na, nb) = (a.len(), b.len());
    if na < 3 || nb < 3 {
        return None;
    }

    // Face A from the edge's end all the way round to its start.
    let mut merged: Vec<VertexIndex> = (0..na).map(|k| a[(ea + 1 + k) % na]).collect();

    // Face B's edge runs the other way when both faces wind consistently.
    let a_end = mesh.position(a[(ea + 1) % na])?;
    let b_start = mesh.position(b[eb])?;
    let interior = nb - 2;
    if b_start.distance(a_end) <= epsilon {
        merged.extend((0..interior).map(|k| b[(eb + 2 + k) % nb]));
    } else {
        merged.extend((0..interior).map(|k| b[(eb + nb - 1 - k) % nb]));
    }

    let mut sorted = merged.clone();
    sorted.sort_unstable();
    sorted.dedup();
    (merged.len() >= 3 && sorted.len() == merged.len()).then_some(merged)
}
