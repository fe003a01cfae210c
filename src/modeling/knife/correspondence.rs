//! Where a cut on one edge of a quad lands on the quad's opposite edge.
//!
//! Consistently wound quads traverse opposite edges in reverse, so the
//! parametric mapping is `t -> 1 - t` along face-local directions. The
//! line-projection mapping re-intersects the original screen-space cut line
//! with the opposite edge instead, falling back to the parametric mapping
//! when the line misses.

use bevy::prelude::*;

use super::edge::PositionEdge;
use super::hit_test::line_segment_intersection;
use super::projection::Projection;

/// Smallest cut parameter allowed; keeps sub-edges from collapsing.
pub const MIN_CUT_T: f32 = 0.05;
/// Largest cut parameter allowed.
pub const MAX_CUT_T: f32 = 0.95;

/// Clamp a cut parameter into the allowed band.
pub fn clamp_cut_t(t: f32) -> f32 {
    t.clamp(MIN_CUT_T, MAX_CUT_T)
}

/// Which mapping a belt uses to place cut points on opposite edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrespondenceMode {
    /// Continuous drag: mirror the parameter.
    Parametric,
    /// Two discrete clicks: re-intersect the screen line through both picks.
    LineProjection { line_a: Vec2, line_b: Vec2 },
}

/// Map a point on `source` (oriented along its face) onto `opposite` (also
/// face-oriented) by the `1 - t` rule. Returns the new point and its parameter.
pub fn parametric(source: &PositionEdge, point: Vec3, opposite: &PositionEdge) -> (Vec3, f32) {
    let t = clamp_cut_t(source.parameter_of(point));
    let mapped = 1.0 - t;
    (opposite.point_at(mapped), mapped)
}

/// Re-intersect the screen line `line_a`–`line_b` with `opposite`.
///
/// Falls back to [`parametric`] when either endpoint of the opposite edge
/// does not project or the line does not cross the projected segment.
pub fn line_projection(
    projection: &impl Projection,
    line_a: Vec2,
    line_b: Vec2,
    source: &PositionEdge,
    point: Vec3,
    opposite: &PositionEdge,
) -> (Vec3, f32) {
    let crossing = projection
        .world_to_screen(opposite.a)
        .zip(projection.world_to_screen(opposite.b))
        .and_then(|(s0, s1)| line_segment_intersection(line_a, line_b, s0, s1));

    match crossing {
        Some(u) => {
            let t = clamp_cut_t(u);
            (opposite.point_at(t), t)
        }
        None => parametric(source, point, opposite),
    }
}

/// Dispatch on `mode`.
pub fn map_cut(
    mode: CorrespondenceMode,
    projection: &impl Projection,
    source: &PositionEdge,
    point: Vec3,
    opposite: &PositionEdge,
) -> (Vec3, f32) {
    match mode {
        CorrespondenceMode::Parametric => parametric(source, point, opposite),
        CorrespondenceMode::LineProjection { line_a, line_b } => {
            line_projection(projection, line_a, line_b, source, point, opposite)
        }
    }
}
