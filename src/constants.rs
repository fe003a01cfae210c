//! Centralized constants for the knife tool
//!
//! Shared colors and default values, kept in one place so overlays and
//! panels agree.

use bevy::prelude::*;

/// Gizmo colors for knife overlays
pub mod knife_colors {
    use super::*;

    /// Edge under the cursor before the first pick
    pub const HOVER: Color = Color::srgb(0.306, 0.788, 0.839);
    /// First picked edge of a gesture
    pub const PICKED: Color = Color::srgb(0.808, 0.569, 0.341);
    /// Preview of the cut that would be committed
    pub const CUT: Color = Color::srgb(1.0, 0.2, 0.2);
}

/// Demo scene defaults
pub mod demo {
    use super::*;

    /// Material color of the demo mesh
    pub const MESH_COLOR: Color = Color::srgb(0.8, 0.7, 0.6);
    /// Number of quads around the demo cylinder
    pub const RING_SEGMENTS: u32 = 12;
    /// Number of quad rows along the demo cylinder
    pub const RING_ROWS: u32 = 4;
}
