mod history;

pub use history::*;

use bevy::prelude::*;

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(HistoryPlugin);
    }
}
