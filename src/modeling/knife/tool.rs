//! Knife tool state machine.
//!
//! The tool turns pointer events into cut plans and commits them. It owns no
//! mesh; every handler is given a [`KnifeContext`] borrowing the mesh, the
//! projection and the sync/undo collaborators for the duration of the call.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::belt::traverse_belt;
use super::commit::{CommitReport, MeshSync, UndoRecorder, commit_cut, commit_edit};
use super::correspondence::CorrespondenceMode;
use super::edge::{BeltStep, CutPlan};
use super::erase_edge::erase_edge;
use super::hit_test::{EdgeHit, VertexHit, pick_edge, pick_edge_on_face, pick_vertex};
use super::insert_vertex::insert_vertex_on_edge;
use super::projection::Projection;
use super::settings::KnifeSettings;
use crate::modeling::poly_mesh::PolyMesh;

/// What a pick on the mesh does.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum KnifeOperation {
    /// Split faces between two picked edges.
    #[default]
    Cut,
    /// Add a vertex on the picked edge.
    InsertVertex,
    /// Merge the two faces sharing the picked edge.
    EraseEdge,
}

impl KnifeOperation {
    pub fn display_name(&self) -> &'static str {
        match self {
            KnifeOperation::Cut => "Cut",
            KnifeOperation::InsertVertex => "Insert Vertex",
            KnifeOperation::EraseEdge => "Erase Edge",
        }
    }
}

/// How a cut's two picks are made.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InteractionStyle {
    /// Press on the first edge, release on the second.
    #[default]
    Drag,
    /// Click the first edge, then click the second.
    TwoClick,
}

impl InteractionStyle {
    pub fn display_name(&self) -> &'static str {
        match self {
            InteractionStyle::Drag => "Drag",
            InteractionStyle::TwoClick => "Two Click",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            InteractionStyle::Drag => InteractionStyle::TwoClick,
            InteractionStyle::TwoClick => InteractionStyle::Drag,
        }
    }
}

/// Where the current gesture stands.
#[derive(Default, Clone, Debug, PartialEq)]
pub enum KnifeGesture {
    /// Tool inactive.
    #[default]
    Idle,
    /// Waiting for the first edge.
    PendingFirstPick,
    /// Two-click: first edge picked, `hover` previews the cut under the cursor.
    PendingSecondPick { first: EdgeHit, hover: CutPlan },
    /// Drag: first edge picked, `plan` is the cut a release would commit.
    Dragging { first: EdgeHit, plan: CutPlan },
}

/// Everything a handler may touch.
pub struct KnifeContext<'a, P, S, U> {
    pub mesh: &'a mut PolyMesh,
    pub projection: &'a P,
    pub sync: &'a mut S,
    pub undo: &'a mut U,
    pub settings: &'a KnifeSettings,
}

/// Interactive knife tool.
#[derive(Resource, Default, Debug)]
pub struct KnifeTool {
    gesture: KnifeGesture,
    operation: KnifeOperation,
    style: InteractionStyle,
    /// Edge under the cursor while waiting for a first pick.
    hover: Option<EdgeHit>,
    /// Corner a pick would snap to.
    hover_vertex: Option<VertexHit>,
    last_report: Option<CommitReport>,
}

impl KnifeTool {
    pub fn new(operation: KnifeOperation, style: InteractionStyle) -> Self {
        Self {
            operation,
            style,
            ..default()
        }
    }

    pub fn gesture(&self) -> &KnifeGesture {
        &self.gesture
    }

    pub fn operation(&self) -> KnifeOperation {
        self.operation
    }

    pub fn style(&self) -> InteractionStyle {
        self.style
    }

    pub fn is_active(&self) -> bool {
        self.gesture != KnifeGesture::Idle
    }

    /// Edge highlighted under the cursor before the first pick.
    pub fn hover(&self) -> Option<&EdgeHit> {
        self.hover.as_ref()
    }

    /// Face corner under the cursor, within the vertex snap radius.
    pub fn hover_vertex(&self) -> Option<&VertexHit> {
        self.hover_vertex.as_ref()
    }

    /// Result of the most recent commit.
    pub fn last_report(&self) -> Option<CommitReport> {
        self.last_report
    }

    /// Cut currently being previewed, if any.
    pub fn preview(&self) -> Option<&CutPlan> {
        match &self.gesture {
            KnifeGesture::PendingSecondPick { hover, .. } => Some(hover),
            KnifeGesture::Dragging { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// First edge of the gesture in progress.
    pub fn first_pick(&self) -> Option<&EdgeHit> {
        match &self.gesture {
            KnifeGesture::PendingSecondPick { first, .. } | KnifeGesture::Dragging { first, .. } => Some(first),
            _ => None,
        }
    }

    pub fn activate(&mut self) {
        if !self.is_active() {
            self.gesture = KnifeGesture::PendingFirstPick;
            info!("Knife: {} ({})", self.operation.display_name(), self.style.display_name());
        }
    }

    pub fn deactivate(&mut self) {
        self.reset();
        self.gesture = KnifeGesture::Idle;
    }

    /// Abandon the gesture in progress. The mesh is never touched before a
    /// commit, so there is nothing to roll back.
    pub fn reset(&mut self) {
        self.hover = None;
        self.hover_vertex = None;
        if self.is_active() {
            self.gesture = KnifeGesture::PendingFirstPick;
        }
    }

    pub fn set_operation(&mut self, operation: KnifeOperation) {
        if self.operation != operation {
            self.operation = operation;
            self.reset();
            info!("Knife operation: {}", operation.display_name());
        }
    }

    pub fn set_style(&mut self, style: InteractionStyle) {
        if self.style != style {
            self.style = style;
            self.reset();
            info!("Knife style: {}", style.display_name());
        }
    }

    /// Turn loop cutting on or off. A pending preview was built for the old
    /// setting, so the gesture restarts.
    pub fn set_chain(&mut self, settings: &mut KnifeSettings, chain: bool) {
        if settings.chain != chain {
            settings.chain = chain;
            self.reset();
            info!("Knife loop cut: {}", if chain { "ON" } else { "OFF" });
        }
    }

    /// Press. Returns true when the event was consumed.
    pub fn pointer_down<P, S, U>(&mut self, cx: &mut KnifeContext<'_, P, S, U>, cursor: Vec2) -> bool
    where
        P: Projection,
        S: MeshSync,
        U: UndoRecorder,
    {
        match std::mem::take(&mut self.gesture) {
            KnifeGesture::Idle => false,
            KnifeGesture::PendingFirstPick => {
                self.gesture = KnifeGesture::PendingFirstPick;
                let Some(hit) = pick_edge(cx.mesh, cx.projection, cursor, cx.settings.thresholds()) else {
                    debug!("Knife: no edge under cursor");
                    return false;
                };
                self.hover = None;
                match self.operation {
                    KnifeOperation::Cut => {
                        self.gesture = match self.style {
                            InteractionStyle::Drag => KnifeGesture::Dragging {
                                first: hit,
                                plan: CutPlan::default(),
                            },
                            InteractionStyle::TwoClick => KnifeGesture::PendingSecondPick {
                                first: hit,
                                hover: CutPlan::default(),
                            },
                        };
                    }
                    KnifeOperation::InsertVertex => self.insert_vertex(cx, &hit),
                    KnifeOperation::EraseEdge => self.erase(cx, &hit),
                }
                true
            }
            KnifeGesture::PendingSecondPick { first, hover } => {
                match second_pick(cx, self.style, &first, cursor) {
                    Some(plan) => {
                        self.commit(cx, &plan);
                        self.gesture = KnifeGesture::PendingFirstPick;
                    }
                    None => {
                        debug!("Knife: second click missed the face");
                        self.gesture = KnifeGesture::PendingSecondPick { first, hover };
                    }
                }
                true
            }
            dragging @ KnifeGesture::Dragging { .. } => {
                self.gesture = dragging;
                true
            }
        }
    }

    /// Pointer motion, with or without a button held.
    pub fn pointer_drag<P, S, U>(&mut self, cx: &mut KnifeContext<'_, P, S, U>, cursor: Vec2) -> bool
    where
        P: Projection,
    {
        if !self.is_active() {
            return false;
        }
        self.hover_vertex = pick_vertex(cx.mesh, cx.projection, cursor, cx.settings.thresholds());

        let style = self.style;
        match &mut self.gesture {
            KnifeGesture::Idle => false,
            KnifeGesture::PendingFirstPick => {
                self.hover = pick_edge(cx.mesh, cx.projection, cursor, cx.settings.thresholds());
                false
            }
            KnifeGesture::PendingSecondPick { first, hover } => {
                *hover = second_pick(cx, style, first, cursor).unwrap_or_default();
                true
            }
            KnifeGesture::Dragging { first, plan } => {
                *plan = second_pick(cx, style, first, cursor).unwrap_or_default();
                true
            }
        }
    }

    /// Release.
    pub fn pointer_up<P, S, U>(&mut self, cx: &mut KnifeContext<'_, P, S, U>, _cursor: Vec2) -> bool
    where
        P: Projection,
        S: MeshSync,
        U: UndoRecorder,
    {
        match std::mem::take(&mut self.gesture) {
            KnifeGesture::Dragging { plan, .. } => {
                if !plan.is_empty() {
                    self.commit(cx, &plan);
                }
                self.gesture = KnifeGesture::PendingFirstPick;
                true
            }
            pending @ KnifeGesture::PendingSecondPick { .. } => {
                self.gesture = pending;
                true
            }
            other => {
                self.gesture = other;
                false
            }
        }
    }

    fn commit<P, S, U>(&mut self, cx: &mut KnifeContext<'_, P, S, U>, plan: &CutPlan)
    where
        S: MeshSync,
        U: UndoRecorder,
    {
        let mut cache = cx.settings.vertex_cache();
        let report = commit_cut(
            cx.mesh,
            plan,
            &mut cache,
            cx.settings.weld_epsilon,
            cx.sync,
            cx.undo,
            "Knife cut",
        );
        self.last_report = Some(report);
    }

    fn insert_vertex<P, S, U>(&mut self, cx: &mut KnifeContext<'_, P, S, U>, hit: &EdgeHit)
    where
        S: MeshSync,
        U: UndoRecorder,
    {
        let Some(edge) = cx.mesh.edge_positions(hit.face, hit.edge) else {
            return;
        };
        let mut cache = cx.settings.vertex_cache();
        let epsilon = cx.settings.weld_epsilon;
        let inserted = commit_edit(cx.mesh, cx.sync, cx.undo, "Insert vertex", |mesh| {
            let faces = insert_vertex_on_edge(mesh, &edge, hit.position, &mut cache, epsilon);
            (faces > 0).then_some(faces)
        });
        match inserted {
            Some(faces) => {
                info!("Inserted vertex into {} faces", faces);
                self.last_report = Some(CommitReport {
                    faces_split: 0,
                    vertices_created: cache.created(),
                });
            }
            None => debug!("Knife: vertex insert had no effect"),
        }
    }

    fn erase<P, S, U>(&mut self, cx: &mut KnifeContext<'_, P, S, U>, hit: &EdgeHit)
    where
        S: MeshSync,
        U: UndoRecorder,
    {
        let Some(edge) = cx.mesh.edge_positions(hit.face, hit.edge) else {
            return;
        };
        let epsilon = cx.settings.weld_epsilon;
        if commit_edit(cx.mesh, cx.sync, cx.undo, "Erase edge", |mesh| erase_edge(mesh, &edge, epsilon)).is_none() {
            debug!("Knife: edge cannot be erased");
        }
    }
}

/// Pick the second edge on the first pick's face and build the cut plan.
fn second_pick<P: Projection, S, U>(
    cx: &KnifeContext<'_, P, S, U>,
    style: InteractionStyle,
    first: &EdgeHit,
    cursor: Vec2,
) -> Option<CutPlan> {
    let second = pick_edge_on_face(
        cx.mesh,
        first.face,
        cx.projection,
        cursor,
        cx.settings.thresholds(),
        Some(first.edge),
    )?;
    build_plan(cx.mesh, cx.projection, cx.settings, style, first, &second)
}

/// Seed step from two picks on the same face, extended across the belt when
/// chaining is on.
pub fn build_plan(
    mesh: &PolyMesh,
    projection: &impl Projection,
    settings: &KnifeSettings,
    style: InteractionStyle,
    first: &EdgeHit,
    second: &EdgeHit,
) -> Option<CutPlan> {
    if first.face != second.face || first.edge == second.edge {
        return None;
    }
    let edge_a = mesh.edge_positions(first.face, first.edge)?;
    let edge_b = mesh.edge_positions(second.face, second.edge)?;
    if edge_a.is_degenerate() || edge_b.is_degenerate() {
        return None;
    }
    let seed = BeltStep {
        face: first.face,
        edge_a,
        edge_b,
        point_a: first.position,
        point_b: second.position,
    };
    if !settings.chain {
        return Some(CutPlan::single(seed));
    }

    let mode = match style {
        InteractionStyle::Drag => CorrespondenceMode::Parametric,
        InteractionStyle::TwoClick => CorrespondenceMode::LineProjection {
            line_a: first.screen,
            line_b: second.screen,
        },
    };
    Some(traverse_belt(mesh, projection, seed, settings.belt_params(mode)))
}
