//! Meshes and collaborator doubles shared by the knife tests.

use bevy::prelude::*;

use super::commit::{MeshSync, UndoRecorder};
use super::edge::PositionEdge;
use crate::modeling::poly_mesh::PolyMesh;

/// Unit quad `[0, 1, 2, 3]` in the z = 0 plane, counter-clockwise.
pub fn make_quad() -> PolyMesh {
    PolyMesh::from_quads(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        &[&[0, 1, 2, 3]],
    )
}

/// Two quads sharing the edge x = 1.
pub fn make_two_quads() -> PolyMesh {
    // 3--2--5
    // |  |  |
    // 0--1--4
    PolyMesh::from_quads(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
        ],
        &[&[0, 1, 2, 3], &[1, 4, 5, 2]],
    )
}

/// Two quads side by side whose common edge is split at a seam: the right
/// quad has its own copies (4 and 7) of corners 1 and 2.
pub fn make_seam_quads() -> PolyMesh {
    // 3--2 7--6
    // |  | |  |
    // 0--1 4--5
    PolyMesh::from_quads(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ],
        &[&[0, 1, 2, 3], &[4, 5, 6, 7]],
    )
}

/// The edge x = 1 shared by [`make_two_quads`] and [`make_seam_quads`].
pub fn shared_edge() -> PositionEdge {
    PositionEdge::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0))
}

/// `count` unit quads in a row along x, shared vertical edges.
pub fn make_strip(count: u32) -> PolyMesh {
    let mut positions = Vec::new();
    for i in 0..=count {
        positions.push(Vec3::new(i as f32, 0.0, 0.0));
        positions.push(Vec3::new(i as f32, 1.0, 0.0));
    }
    let loops: Vec<Vec<u32>> = (0..count)
        .map(|i| vec![2 * i, 2 * i + 2, 2 * i + 3, 2 * i + 1])
        .collect();
    let refs: Vec<&[u32]> = loops.iter().map(Vec::as_slice).collect();
    PolyMesh::from_quads(&positions, &refs)
}

#[derive(Default)]
pub struct CountingSync {
    pub calls: usize,
}

impl MeshSync for CountingSync {
    fn sync(&mut self, _mesh: &PolyMesh) {
        self.calls += 1;
    }
}

#[derive(Default)]
pub struct RecordingUndo {
    pub records: Vec<(PolyMesh, PolyMesh, String)>,
}

impl RecordingUndo {
    pub fn descriptions(&self) -> Vec<&str> {
        self.records.iter().map(|(_, _, d)| d.as_str()).collect()
    }
}

impl UndoRecorder for RecordingUndo {
    type Snapshot = PolyMesh;

    fn capture_snapshot(&self, mesh: &PolyMesh) -> PolyMesh {
        mesh.clone()
    }

    fn record_topology_change(&mut self, before: PolyMesh, after: PolyMesh, description: &str) {
        self.records.push((before, after, description.to_string()));
    }
}
