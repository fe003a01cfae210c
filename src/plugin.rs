use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use crate::commands::CommandsPlugin;
use crate::modeling::ModelingPlugin;
use crate::ui::UiPlugin;

/// Main plugin that bundles the knife tool, its undo history and its panel
pub struct MeshKnifePlugin;

impl Plugin for MeshKnifePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin::default());
        }
        app.add_plugins(CommandsPlugin)
            .add_plugins(ModelingPlugin)
            .add_plugins(UiPlugin);
    }
}
