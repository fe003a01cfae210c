//! # Bevy Mesh Knife
//!
//! An interactive knife and loop-cut tool for polygon meshes in Bevy.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_mesh_knife::MeshKnifePlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(MeshKnifePlugin)
//!         .run();
//! }
//! ```
//!
//! ## Making a Mesh Cuttable
//!
//! Give the entity a `KnifeTarget` holding its polygon mesh next to the
//! `Mesh3d` it renders with:
//!
//! ```ignore
//! let poly = PolyMesh::from_quads(&positions, &loops);
//! commands.spawn((
//!     Mesh3d(meshes.add(poly.to_bevy_mesh())),
//!     MeshMaterial3d(material),
//!     KnifeTarget::new(poly),
//! ));
//! ```
//!
//! ## Keys
//!
//! - `K` cut, `V` insert vertex, `X` erase edge (press again to turn off)
//! - `C` toggle loop cut across quads, `T` toggle drag / two-click
//! - `Escape` cancel the current pick
//! - `Ctrl+Z` undo, `Ctrl+Shift+Z` / `Ctrl+Y` redo
//!
//! The engine itself (`modeling::knife`) does not depend on the ECS: drive
//! `KnifeTool` directly with any `Projection`, `MeshSync` and `UndoRecorder`.

pub mod commands;
pub mod constants;
pub mod modeling;
mod plugin;
pub mod ui;
mod utils;

pub use plugin::MeshKnifePlugin;

pub use modeling::knife::{
    CommitReport, InteractionStyle, KnifeContext, KnifeGesture, KnifeMeshSynced, KnifeOperation, KnifePlugin,
    KnifeSettings, KnifeTarget, KnifeTool, MeshSync, Projection, UndoRecorder,
};
pub use modeling::poly_mesh::{MeshFace, MeshVertex, PolyMesh};

pub use commands::{RedoEvent, TopologyHistory, UndoEvent};
