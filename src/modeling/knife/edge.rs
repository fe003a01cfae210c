//! Position-keyed edges and the transient records a cut is built from.
//!
//! Adjacent faces are not guaranteed to share vertex indices (UV seams,
//! duplicated vertices), so edges are identified by the world positions of
//! their endpoints, compared within an epsilon in either orientation.

use bevy::prelude::*;

use crate::modeling::poly_mesh::FaceIndex;

/// Distance under which two positions are treated as the same point.
pub const POSITION_EPSILON: f32 = 1e-4;

/// Unordered pair of endpoint positions.
#[derive(Debug, Clone, Copy)]
pub struct PositionEdge {
    pub a: Vec3,
    pub b: Vec3,
}

impl PositionEdge {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// True when both endpoints coincide with `other`'s, in either orientation.
    pub fn matches(&self, other: &PositionEdge, epsilon: f32) -> bool {
        let same = self.a.distance(other.a) <= epsilon && self.b.distance(other.b) <= epsilon;
        let flipped = self.a.distance(other.b) <= epsilon && self.b.distance(other.a) <= epsilon;
        same || flipped
    }

    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() <= POSITION_EPSILON
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.b, self.a)
    }

    /// Point at parameter `t` from `a` to `b`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.a.lerp(self.b, t)
    }

    /// Parameter of `point` projected onto the edge, clamped to [0, 1].
    ///
    /// Degenerate edges report the midpoint.
    pub fn parameter_of(&self, point: Vec3) -> f32 {
        let ab = self.b - self.a;
        let len_sq = ab.length_squared();
        if len_sq <= POSITION_EPSILON * POSITION_EPSILON {
            return 0.5;
        }
        ((point - self.a).dot(ab) / len_sq).clamp(0.0, 1.0)
    }
}

impl PartialEq for PositionEdge {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other, POSITION_EPSILON)
    }
}

/// A cut location on a face-local edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Face-local index of the edge's first vertex.
    pub edge_start: usize,
    /// Face-local index of the edge's second vertex (`edge_start + 1 mod n`).
    pub edge_end: usize,
    /// Parameter along the edge in [0, 1].
    pub t: f32,
    pub position: Vec3,
}

impl Intersection {
    pub fn new(edge_start: usize, face_len: usize, t: f32, position: Vec3) -> Self {
        Self {
            edge_start,
            edge_end: (edge_start + 1) % face_len.max(1),
            t,
            position,
        }
    }
}

/// One face of a (possibly single-face) cut chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeltStep {
    pub face: FaceIndex,
    pub edge_a: PositionEdge,
    pub edge_b: PositionEdge,
    pub point_a: Vec3,
    pub point_b: Vec3,
}

/// An ordered cut chain, seed step first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutPlan {
    pub steps: Vec<BeltStep>,
}

impl CutPlan {
    pub fn single(step: BeltStep) -> Self {
        Self { steps: vec![step] }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}
