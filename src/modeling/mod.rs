//! Mesh modeling: the editable polygon mesh and the knife tool that cuts it.

pub mod knife;
pub mod poly_mesh;

use bevy::prelude::*;

use knife::KnifePlugin;

pub struct ModelingPlugin;

impl Plugin for ModelingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(KnifePlugin);
    }
}
