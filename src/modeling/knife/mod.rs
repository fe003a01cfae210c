//! Knife tool: cut polygon faces along a picked chord, optionally as a
//! loop cut running across a band of quads.
//!
//! The pieces are layered leaves first: picking (`hit_test`), cut-point
//! mapping across quads (`correspondence`), the belt walk (`belt`), new-vertex
//! deduplication (`vertex_cache`), face splitting (`split`) and the commit
//! boundary (`commit`). `tool` ties them to pointer events; this module wires
//! the tool into Bevy.

pub mod belt;
pub mod commit;
pub mod correspondence;
pub mod edge;
pub mod erase_edge;
mod gizmos;
pub mod hit_test;
pub mod insert_vertex;
pub mod projection;
pub mod settings;
pub mod split;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod tool;
pub mod vertex_cache;

pub use commit::{CommitReport, MeshSync, UndoRecorder};
pub use edge::{BeltStep, CutPlan, PositionEdge};
pub use gizmos::KnifeGizmos;
pub use projection::{CameraProjection, LocalProjection, LookAtProjection, Projection, ScreenRect};
pub use settings::KnifeSettings;
pub use tool::{InteractionStyle, KnifeContext, KnifeGesture, KnifeOperation, KnifeTool};

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::commands::{RedoEvent, TopologyHistory, UndoEvent};
use crate::modeling::poly_mesh::PolyMesh;
use crate::utils::{active_camera, should_process_input, should_process_pointer};
use gizmos::configure_knife_gizmos;

/// Marks the entity whose mesh the knife edits. `mesh` is in the entity's
/// local space and is the source of truth; its `Mesh3d` is rebuilt from it.
#[derive(Component, Debug, Clone)]
pub struct KnifeTarget {
    pub mesh: PolyMesh,
}

impl KnifeTarget {
    pub fn new(mesh: PolyMesh) -> Self {
        Self { mesh }
    }

    pub fn from_bevy_mesh(mesh: &Mesh) -> Option<Self> {
        PolyMesh::from_bevy_mesh(mesh).map(Self::new)
    }
}

/// Sent after a target's render mesh was rebuilt from its `PolyMesh`.
#[derive(Message, Debug, Clone, Copy)]
pub struct KnifeMeshSynced {
    pub entity: Entity,
}

/// Writes the edited mesh back into the target's mesh asset.
pub struct AssetMeshSync<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub handle: &'a Handle<Mesh>,
    pub synced: bool,
}

impl<'a> AssetMeshSync<'a> {
    pub fn new(meshes: &'a mut Assets<Mesh>, handle: &'a Handle<Mesh>) -> Self {
        Self {
            meshes,
            handle,
            synced: false,
        }
    }
}

impl MeshSync for AssetMeshSync<'_> {
    fn sync(&mut self, mesh: &PolyMesh) {
        let Some(mut asset) = self.meshes.get_mut(self.handle) else {
            warn!("Knife target mesh asset missing, cannot sync");
            return;
        };
        *asset = mesh.to_bevy_mesh();
        self.synced = true;
    }
}

pub struct KnifePlugin;

impl Plugin for KnifePlugin {
    fn build(&self, app: &mut App) {
        // Load settings on startup
        let settings = KnifeSettings::load();
        app.insert_resource(KnifeTool::new(settings.operation, settings.style))
            .insert_resource(settings)
            .init_gizmo_group::<KnifeGizmos>()
            .add_message::<KnifeMeshSynced>()
            .register_type::<KnifeGizmos>()
            .add_systems(Startup, configure_knife_gizmos)
            .add_systems(
                Update,
                (
                    handle_knife_keys,
                    handle_knife_pointer,
                    apply_undo_redo,
                    draw_knife_gizmos,
                )
                    .chain(),
            );
    }
}

/// Keyboard shortcuts: K cut, V insert vertex, X erase edge, C loop cut,
/// T interaction style, Escape cancel.
fn handle_knife_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tool: ResMut<KnifeTool>,
    mut settings: ResMut<KnifeSettings>,
    mut contexts: EguiContexts,
) {
    if !should_process_input(&mut contexts) {
        return;
    }

    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if ctrl {
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        if tool.first_pick().is_some() {
            tool.reset();
            info!("Knife: cancelled");
        } else {
            tool.deactivate();
            info!("Knife: off");
        }
        return;
    }

    for (key, operation) in [
        (KeyCode::KeyK, KnifeOperation::Cut),
        (KeyCode::KeyV, KnifeOperation::InsertVertex),
        (KeyCode::KeyX, KnifeOperation::EraseEdge),
    ] {
        if !keyboard.just_pressed(key) {
            continue;
        }
        if tool.is_active() && tool.operation() == operation {
            tool.deactivate();
            info!("Knife: off");
        } else {
            tool.set_operation(operation);
            tool.activate();
            if settings.operation != operation {
                settings.operation = operation;
                settings.save();
            }
        }
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        let chain = !settings.chain;
        tool.set_chain(&mut settings, chain);
        settings.save();
    }

    if keyboard.just_pressed(KeyCode::KeyT) {
        let style = tool.style().toggled();
        tool.set_style(style);
        settings.style = style;
        settings.save();
    }
}

/// Feed mouse input on the knife target into the tool.
fn handle_knife_pointer(
    mouse_button: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut target_query: Query<(Entity, &mut KnifeTarget, &GlobalTransform, &Mesh3d)>,
    mut tool: ResMut<KnifeTool>,
    settings: Res<KnifeSettings>,
    mut history: ResMut<TopologyHistory>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut contexts: EguiContexts,
    mut synced: MessageWriter<KnifeMeshSynced>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    if !tool.is_active() {
        return;
    }
    let Ok(window) = window_query.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let moved = *last_cursor != Some(cursor);
    *last_cursor = Some(cursor);

    let pressed = mouse_button.just_pressed(MouseButton::Left);
    let released = mouse_button.just_released(MouseButton::Left);
    // Presses over the UI belong to the UI; releases always reach a drag in progress.
    if pressed && !should_process_pointer(&mut contexts) {
        return;
    }
    if !pressed && !released && !moved {
        return;
    }

    let Some((camera, camera_transform)) = active_camera(camera_query.iter()) else {
        return;
    };
    let Some((entity, mut target, target_transform, mesh3d)) = target_query.iter_mut().next() else {
        return;
    };

    let camera_projection = CameraProjection {
        camera,
        transform: camera_transform,
    };
    let projection = LocalProjection {
        world: &camera_projection,
        local_to_world: target_transform,
    };
    let mut sync = AssetMeshSync::new(&mut meshes, &mesh3d.0);
    let mut cx = KnifeContext {
        mesh: &mut target.mesh,
        projection: &projection,
        sync: &mut sync,
        undo: &mut *history,
        settings: &*settings,
    };

    if moved {
        tool.pointer_drag(&mut cx, cursor);
    }
    if pressed {
        tool.pointer_down(&mut cx, cursor);
    }
    if released {
        tool.pointer_up(&mut cx, cursor);
    }

    if sync.synced {
        synced.write(KnifeMeshSynced { entity });
    }
}

/// Restore target meshes from the topology history.
fn apply_undo_redo(
    mut undo_events: MessageReader<UndoEvent>,
    mut redo_events: MessageReader<RedoEvent>,
    mut history: ResMut<TopologyHistory>,
    mut target_query: Query<(Entity, &mut KnifeTarget, &Mesh3d)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut tool: ResMut<KnifeTool>,
    mut synced: MessageWriter<KnifeMeshSynced>,
) {
    let mut restored: Option<PolyMesh> = None;
    for _ in undo_events.read() {
        let description = history.undo_description().map(str::to_owned);
        if let Some(mesh) = history.undo() {
            restored = Some(mesh.clone());
            info!("Undo: {}", description.unwrap_or_default());
        }
    }
    for _ in redo_events.read() {
        let description = history.redo_description().map(str::to_owned);
        if let Some(mesh) = history.redo() {
            restored = Some(mesh.clone());
            info!("Redo: {}", description.unwrap_or_default());
        }
    }

    let Some(mesh) = restored else {
        return;
    };
    let Some((entity, mut target, mesh3d)) = target_query.iter_mut().next() else {
        return;
    };
    tool.reset();
    let mut sync = AssetMeshSync::new(&mut meshes, &mesh3d.0);
    sync.sync(&mesh);
    target.mesh = mesh;
    if sync.synced {
        synced.write(KnifeMeshSynced { entity });
    }
}

fn draw_knife_gizmos(
    mut gizmos: Gizmos<KnifeGizmos>,
    tool: Res<KnifeTool>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    target_query: Query<(&KnifeTarget, &GlobalTransform)>,
) {
    let Some((camera, camera_transform)) = active_camera(camera_query.iter()) else {
        return;
    };
    let Some((target, target_transform)) = target_query.iter().next() else {
        return;
    };
    let projection = CameraProjection {
        camera,
        transform: camera_transform,
    };
    tool.draw_gizmos(&mut gizmos, &target.mesh, target_transform, &projection);
}
