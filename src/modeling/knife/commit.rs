//! Apply a cut plan to the mesh as one undoable change.
//!
//! Steps are applied in descending face index. Splitting face `i` rewrites
//! slot `i` and appends the other half, so every lower, still-pending index
//! stays valid.

use bevy::prelude::*;

use super::edge::{BeltStep, CutPlan, Intersection, PositionEdge};
use super::split::{FaceCut, split_face};
use super::vertex_cache::VertexCache;
use crate::modeling::poly_mesh::{PolyMesh, VertexIndex};

/// Pushes edited mesh data to its renderable representation.
pub trait MeshSync {
    fn sync(&mut self, mesh: &PolyMesh);
}

/// Receives before/after snapshots of a topology change.
pub trait UndoRecorder {
    type Snapshot;

    fn capture_snapshot(&self, mesh: &PolyMesh) -> Self::Snapshot;

    fn record_topology_change(&mut self, before: Self::Snapshot, after: Self::Snapshot, description: &str);
}

/// What a commit changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub faces_split: usize,
    pub vertices_created: usize,
}

impl CommitReport {
    pub fn changed(&self) -> bool {
        self.faces_split > 0 || self.vertices_created > 0
    }
}

/// Run `edit` between two snapshots and record it as one undo entry.
///
/// When `edit` reports no change (`None`), the sync target and the undo
/// history are left alone.
pub fn commit_edit<U: UndoRecorder, R>(
    mesh: &mut PolyMesh,
    sync: &mut impl MeshSync,
    undo: &mut U,
    description: &str,
    edit: impl FnOnce(&mut PolyMesh) -> Option<R>,
) -> Option<R> {
    let before = undo.capture_snapshot(mesh);
    let result = edit(mesh)?;
    sync.sync(mesh);
    let after = undo.capture_snapshot(mesh);
    undo.record_topology_change(before, after, description);
    Some(result)
}

/// Apply every step of `plan`, then sync once and record one undo entry.
///
/// An empty plan, or a plan whose steps all fail to apply, leaves the mesh,
/// the sync target and the undo history untouched.
pub fn commit_cut<U: UndoRecorder>(
    mesh: &mut PolyMesh,
    plan: &CutPlan,
    cache: &mut VertexCache,
    epsilon: f32,
    sync: &mut impl MeshSync,
    undo: &mut U,
    description: &str,
) -> CommitReport {
    if plan.is_empty() {
        return CommitReport::default();
    }

    let report = commit_edit(mesh, sync, undo, description, |mesh| {
        let report = apply_plan(mesh, plan, cache, epsilon);
        report.changed().then_some(report)
    });
    let Some(report) = report else {
        debug!("{}: nothing to apply", description);
        return CommitReport::default();
    };
    info!(
        "{}: split {} faces, added {} vertices",
        description, report.faces_split, report.vertices_created
    );
    report
}

/// Apply the steps of `plan` in descending face index without syncing or recording.
pub fn apply_plan(mesh: &mut PolyMesh, plan: &CutPlan, cache: &mut VertexCache, epsilon: f32) -> CommitReport {
    let created_before = cache.created();

    let mut order: Vec<&BeltStep> = plan.steps.iter().collect();
    order.sort_by(|a, b| b.face.cmp(&a.face));

    let mut faces_split = 0;
    for step in order {
        if apply_step(mesh, step, cache, epsilon) {
            faces_split += 1;
        } else {
            debug!("Skipped cut on face {}", step.face);
        }
    }

    CommitReport {
        faces_split,
        vertices_created: cache.created() - created_before,
    }
}

// Placeholders for cut vertices that do not exist yet; never valid indices of
// a mesh small enough to edit interactively.
const PENDING_A: VertexIndex = VertexIndex::MAX;
const PENDING_B: VertexIndex = VertexIndex::MAX - 1;

/// Split one face. Returns false, without touching the mesh, if the step no
/// longer applies.
fn apply_step(mesh: &mut PolyMesh, step: &BeltStep, cache: &mut VertexCache, epsilon: f32) -> bool {
    let Some(face) = mesh.face(step.face).cloned() else {
        return false;
    };
    let n = face.len();
    let (Some(ia), Some(ib)) = (
        mesh.find_edge(step.face, &step.edge_a, epsilon),
        mesh.find_edge(step.face, &step.edge_b, epsilon),
    ) else {
        return false;
    };
    if ia == ib || step.point_a.distance(step.point_b) <= epsilon {
        return false;
    }
    let (Some(local_a), Some(local_b)) = (mesh.edge_positions(step.face, ia), mesh.edge_positions(step.face, ib))
    else {
        return false;
    };

    let at_a = Intersection::new(ia, n, local_a.parameter_of(step.point_a), step.point_a);
    let at_b = Intersection::new(ib, n, local_b.parameter_of(step.point_b), step.point_b);

    // Validate against the loop before creating any vertex.
    let tentative = |at: &Intersection, edge: &PositionEdge, pending| FaceCut {
        at: *at,
        vertex: cache.lookup_on_face(&face, at, edge).unwrap_or(pending),
    };
    if split_face(
        &face,
        tentative(&at_a, &local_a, PENDING_A),
        tentative(&at_b, &local_b, PENDING_B),
    )
    .is_none()
    {
        return false;
    }

    let va = cache.resolve_on_face(mesh, &face, &at_a, &local_a);
    let vb = cache.resolve_on_face(mesh, &face, &at_b, &local_b);
    let Some([first, second]) = split_face(
        &face,
        FaceCut { at: at_a, vertex: va },
        FaceCut { at: at_b, vertex: vb },
    ) else {
        return false;
    };

    mesh.faces[step.face] = first;
    mesh.faces.push(second);
    true
}
