//! Demo binary: an open quad cylinder to cut.
//!
//! Press K and drag across a quad; with loop cut on, the cut runs around the
//! whole ring.

use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_mesh_knife::constants::demo;
use bevy_mesh_knife::{KnifeTarget, MeshKnifePlugin, PolyMesh};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Bevy Mesh Knife".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(InfiniteGridPlugin)
        .add_plugins(MeshKnifePlugin)
        .add_systems(Startup, setup_scene)
        .run();
}

/// Open cylinder of `segments` x `rows` quads, radius 1, height 2, wound outward.
fn make_cylinder(segments: u32, rows: u32) -> PolyMesh {
    let mut positions = Vec::new();
    for row in 0..=rows {
        let y = row as f32 * 2.0 / rows as f32;
        for s in 0..segments {
            let angle = s as f32 / segments as f32 * std::f32::consts::TAU;
            positions.push(Vec3::new(angle.cos(), y, -angle.sin()));
        }
    }
    let index = |row: u32, s: u32| row * segments + s % segments;
    let loops: Vec<Vec<u32>> = (0..rows)
        .flat_map(|row| {
            (0..segments).map(move |s| {
                vec![
                    index(row, s),
                    index(row, s + 1),
                    index(row + 1, s + 1),
                    index(row + 1, s),
                ]
            })
        })
        .collect();
    let refs: Vec<&[u32]> = loops.iter().map(Vec::as_slice).collect();
    PolyMesh::from_quads(&positions, &refs)
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(3.0, 3.0, 5.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            x_axis_color: Color::srgb(0.8, 0.2, 0.2),
            z_axis_color: Color::srgb(0.2, 0.2, 0.8),
            fadeout_distance: 200.0,
            ..default()
        },
        ..default()
    });

    let poly = make_cylinder(demo::RING_SEGMENTS, demo::RING_ROWS).with_smooth_normals();
    commands.spawn((
        Name::new("Knife Target"),
        Mesh3d(meshes.add(poly.to_bevy_mesh())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: demo::MESH_COLOR,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
        KnifeTarget::new(poly),
    ));
}
