//! Shared utility functions for input handling

use bevy::prelude::*;
use bevy_egui::EguiContexts;

/// Check if keyboard input should be processed by knife systems.
///
/// Returns `false` (block input) if the egui UI wants keyboard input
/// (e.g., text fields are focused).
pub fn should_process_input(contexts: &mut EguiContexts) -> bool {
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return false;
        }
    }

    true
}

/// Check if pointer input should reach the mesh rather than the UI.
pub fn should_process_pointer(contexts: &mut EguiContexts) -> bool {
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
            return false;
        }
    }

    true
}

/// First camera that is active, with its transform.
pub fn active_camera<'a>(
    cameras: impl IntoIterator<Item = (&'a Camera, &'a GlobalTransform)>,
) -> Option<(&'a Camera, &'a GlobalTransform)> {
    cameras.into_iter().find(|(camera, _)| camera.is_active)
}
