use bevy::prelude::*;
use std::collections::VecDeque;

use crate::modeling::knife::commit::UndoRecorder;
use crate::modeling::poly_mesh::PolyMesh;

/// Maximum number of undo/redo entries to keep
const MAX_HISTORY: usize = 100;

/// One recorded topology edit
#[derive(Debug, Clone)]
pub struct TopologyChange {
    pub before: PolyMesh,
    pub after: PolyMesh,
    pub description: String,
}

/// Resource to manage undo/redo history of mesh topology edits
#[derive(Resource)]
pub struct TopologyHistory {
    undo_stack: VecDeque<TopologyChange>,
    redo_stack: VecDeque<TopologyChange>,
    capacity: usize,
}

impl Default for TopologyHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl TopologyHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, change: TopologyChange) {
        // Clear redo stack when a new change is pushed
        self.redo_stack.clear();

        if self.undo_stack.len() >= self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(change);
    }

    /// Step back; returns the mesh to restore.
    pub fn undo(&mut self) -> Option<&PolyMesh> {
        let change = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(change);
        self.redo_stack.back().map(|c| &c.before)
    }

    /// Step forward; returns the mesh to restore.
    pub fn redo(&mut self) -> Option<&PolyMesh> {
        let change = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(change);
        self.undo_stack.back().map(|c| &c.after)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}

impl UndoRecorder for TopologyHistory {
    type Snapshot = PolyMesh;

    fn capture_snapshot(&self, mesh: &PolyMesh) -> PolyMesh {
        mesh.clone()
    }

    fn record_topology_change(&mut self, before: PolyMesh, after: PolyMesh, description: &str) {
        self.push(TopologyChange {
            before,
            after,
            description: description.to_string(),
        });
    }
}

/// Event to trigger undo
#[derive(Message)]
pub struct UndoEvent;

/// Event to trigger redo
#[derive(Message)]
pub struct RedoEvent;

pub struct HistoryPlugin;

impl Plugin for HistoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TopologyHistory>()
            .add_message::<UndoEvent>()
            .add_message::<RedoEvent>()
            .add_systems(Update, handle_undo_redo_input);
    }
}

fn handle_undo_redo_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut undo_events: MessageWriter<UndoEvent>,
    mut redo_events: MessageWriter<RedoEvent>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);

    if ctrl && keyboard.just_pressed(KeyCode::KeyZ) {
        if keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight) {
            redo_events.write(RedoEvent);
        } else {
            undo_events.write(UndoEvent);
        }
    }

    // Alternative: Ctrl+Y for redo
    if ctrl && keyboard.just_pressed(KeyCode::KeyY) {
        redo_events.write(RedoEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_faces(count: usize) -> PolyMesh {
        let mut mesh = PolyMesh::from_quads(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[]);
        for _ in 0..count {
            mesh.faces.push(crate::modeling::poly_mesh::MeshFace::new(vec![0, 1, 2], 0));
        }
        mesh
    }

    #[test]
    fn undo_then_redo_restores_both_sides() {
        let mut history = TopologyHistory::default();
        history.record_topology_change(mesh_with_faces(1), mesh_with_faces(2), "Knife cut");
        assert_eq!(history.undo_description(), Some("Knife cut"));

        assert_eq!(history.undo().map(PolyMesh::face_count), Some(1));
        assert!(!history.can_undo());
        assert_eq!(history.redo_description(), Some("Knife cut"));
        assert_eq!(history.redo().map(PolyMesh::face_count), Some(2));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn new_change_clears_redo() {
        let mut history = TopologyHistory::default();
        history.record_topology_change(mesh_with_faces(1), mesh_with_faces(2), "a");
        history.undo();
        history.record_topology_change(mesh_with_faces(1), mesh_with_faces(3), "b");
        assert!(!history.can_redo());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn oldest_entry_is_dropped_at_capacity() {
        let mut history = TopologyHistory::with_capacity(2);
        for i in 0..3 {
            history.record_topology_change(mesh_with_faces(i), mesh_with_faces(i + 1), &format!("edit {i}"));
        }
        assert_eq!(history.len(), 2);
        history.undo();
        assert_eq!(history.undo_description(), Some("edit 1"));
    }
}
