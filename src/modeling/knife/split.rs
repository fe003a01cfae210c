//! Split one polygon into two along a chord between two of its edges.

use super::edge::Intersection;
use crate::modeling::poly_mesh::{MeshFace, VertexIndex};

/// A cut on a face edge together with the vertex standing at the cut point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCut {
    pub at: Intersection,
    pub vertex: VertexIndex,
}

/// Split a vertex loop at two cuts.
///
/// The first loop runs from cut `a` forward to cut `b`, the second from `b`
/// forward back to `a`. A cut vertex that coincides with one of the edge's
/// own endpoints is collapsed. Returns `None` for identical or invalid edges
/// and when either half would have fewer than three distinct vertices.
pub fn split_loop(
    loop_vertices: &[VertexIndex],
    a: FaceCut,
    b: FaceCut,
) -> Option<(Vec<VertexIndex>, Vec<VertexIndex>)> {
    let n = loop_vertices.len();
    if n < 3 {
        return None;
    }
    let valid = |cut: &FaceCut| cut.at.edge_start < n && cut.at.edge_end == (cut.at.edge_start + 1) % n;
    if !valid(&a) || !valid(&b) || a.at.edge_start == b.at.edge_start {
        return None;
    }

    let (i, j) = (a.at.edge_start, b.at.edge_start);
    let walk = |from: usize, to: usize| -> Vec<VertexIndex> {
        let mut out = Vec::new();
        let mut k = from;
        loop {
            out.push(loop_vertices[k]);
            if k == to {
                break;
            }
            k = (k + 1) % n;
        }
        out
    };

    let mut first = vec![a.vertex];
    first.extend(walk((i + 1) % n, j));
    first.push(b.vertex);

    let mut second = vec![b.vertex];
    second.extend(walk((j + 1) % n, i));
    second.push(a.vertex);

    let first = collapse(first)?;
    let second = collapse(second)?;
    Some((first, second))
}

/// Remove cyclic consecutive duplicates; reject loops that are too small or pinched.
fn collapse(mut vertices: Vec<VertexIndex>) -> Option<Vec<VertexIndex>> {
    vertices.dedup();
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return None;
    }
    let mut sorted = vertices.clone();
    sorted.sort_unstable();
    sorted.dedup();
    (sorted.len() == vertices.len()).then_some(vertices)
}

/// Split `face` into two faces that inherit its material.
pub fn split_face(face: &MeshFace, a: FaceCut, b: FaceCut) -> Option<[MeshFace; 2]> {
    let (first, second) = split_loop(&face.vertices, a, b)?;
    Some([
        MeshFace::new(first, face.material),
        MeshFace::new(second, face.material),
    ])
}
