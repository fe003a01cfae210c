//! Gizmo rendering for the knife tool.
//!
//! Draws the edge under the cursor, the first pick of a gesture and the cut
//! preview. Point markers keep a constant on-screen size.

use bevy::prelude::*;

use super::edge::CutPlan;
use super::hit_test::EdgeHit;
use super::projection::Projection;
use super::tool::KnifeTool;
use crate::constants::knife_colors;
use crate::modeling::poly_mesh::PolyMesh;

/// Marker radius in pixels.
const MARKER_PX: f32 = 5.0;
/// Radius of the ring around a snap corner, in pixels.
const SNAP_PX: f32 = 9.0;

/// Gizmo group for knife overlays, drawn in front of the mesh.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct KnifeGizmos;

/// Configure knife gizmo appearance
pub fn configure_knife_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<KnifeGizmos>();
    config.line.width = 3.0;
    config.depth_bias = -1.0;
}

impl KnifeTool {
    /// Draw the gesture in progress. `mesh` is in the local space of `transform`;
    /// `projection` maps world space to the screen.
    pub fn draw_gizmos(
        &self,
        gizmos: &mut Gizmos<KnifeGizmos>,
        mesh: &PolyMesh,
        transform: &GlobalTransform,
        projection: &impl Projection,
    ) {
        if !self.is_active() {
            return;
        }

        if let Some(hit) = self.hover() {
            draw_edge(gizmos, mesh, transform, hit, knife_colors::HOVER);
            draw_marker(gizmos, projection, transform.transform_point(hit.position), MARKER_PX, knife_colors::HOVER);
        }

        if let Some(corner) = self.hover_vertex() {
            let world = transform.transform_point(corner.position);
            draw_marker(gizmos, projection, world, SNAP_PX, knife_colors::HOVER);
        }

        if let Some(first) = self.first_pick() {
            draw_edge(gizmos, mesh, transform, first, knife_colors::PICKED);
            draw_marker(gizmos, projection, transform.transform_point(first.position), MARKER_PX, knife_colors::PICKED);
        }

        if let Some(plan) = self.preview() {
            draw_plan(gizmos, projection, transform, plan);
        }
    }
}

fn draw_edge(gizmos: &mut Gizmos<KnifeGizmos>, mesh: &PolyMesh, transform: &GlobalTransform, hit: &EdgeHit, color: Color) {
    let Some(edge) = mesh.edge_positions(hit.face, hit.edge) else {
        return;
    };
    gizmos.line(transform.transform_point(edge.a), transform.transform_point(edge.b), color);
}

fn draw_plan(gizmos: &mut Gizmos<KnifeGizmos>, projection: &impl Projection, transform: &GlobalTransform, plan: &CutPlan) {
    for step in &plan.steps {
        let a = transform.transform_point(step.point_a);
        let b = transform.transform_point(step.point_b);
        gizmos.line(a, b, knife_colors::CUT);
        draw_marker(gizmos, projection, a, MARKER_PX, knife_colors::CUT);
        draw_marker(gizmos, projection, b, MARKER_PX, knife_colors::CUT);
    }
}

/// Sphere at `world` sized to `radius_px` pixels.
fn draw_marker(
    gizmos: &mut Gizmos<KnifeGizmos>,
    projection: &impl Projection,
    world: Vec3,
    radius_px: f32,
    color: Color,
) {
    let radius = projection
        .screen_delta_to_world_delta(world, Vec2::new(radius_px, 0.0))
        .length();
    if radius > 0.0 {
        gizmos.sphere(Isometry3d::from_translation(world), radius, color);
    }
}
