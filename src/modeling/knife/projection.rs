//! World/screen conversion used by hit-testing and correspondence.
//!
//! The knife never does camera math itself; it is handed a `Projection`.
//! Screen coordinates follow Bevy's viewport convention (origin top-left,
//! y pointing down, logical pixels).

use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;

/// Projection adapter injected by the host.
pub trait Projection {
    /// Project a world position to screen space. `None` if it cannot be shown
    /// (behind the camera, outside the depth range).
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2>;

    /// World-space displacement at the depth of `anchor` that corresponds to a
    /// screen-space displacement of `delta` pixels.
    fn screen_delta_to_world_delta(&self, anchor: Vec3, delta: Vec2) -> Vec3;
}

/// Screen rectangle a projection maps into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl ScreenRect {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    fn aspect(&self) -> f32 {
        if self.size.y <= 0.0 {
            1.0
        } else {
            self.size.x / self.size.y
        }
    }
}

/// Perspective look-at camera as a pure function of viewport and camera placement.
#[derive(Debug, Clone, Copy)]
pub struct LookAtProjection {
    pub viewport: ScreenRect,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl LookAtProjection {
    pub fn new(viewport: ScreenRect, camera_position: Vec3, camera_target: Vec3) -> Self {
        Self {
            viewport,
            camera_position,
            camera_target,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.01,
            far: 1000.0,
        }
    }

    fn forward(&self) -> Vec3 {
        (self.camera_target - self.camera_position).normalize_or(Vec3::NEG_Z)
    }

    fn up_hint(&self) -> Vec3 {
        if self.forward().cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        }
    }

    fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.camera_position, self.camera_target, self.up_hint());
        let proj = Mat4::perspective_rh(self.fov_y, self.viewport.aspect(), self.near, self.far);
        proj * view
    }

    /// World units covered by one pixel at `depth` in front of the camera.
    fn world_per_pixel(&self, depth: f32) -> f32 {
        if self.viewport.size.y <= 0.0 {
            return 0.0;
        }
        2.0 * depth * (self.fov_y * 0.5).tan() / self.viewport.size.y
    }
}

impl Projection for LookAtProjection {
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= self.near * 0.5 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        let size = self.viewport.size;
        Some(
            self.viewport.origin
                + Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y),
        )
    }

    fn screen_delta_to_world_delta(&self, anchor: Vec3, delta: Vec2) -> Vec3 {
        let forward = self.forward();
        let right = forward.cross(self.up_hint()).normalize_or_zero();
        let up = right.cross(forward);
        let depth = (anchor - self.camera_position).dot(forward).max(self.near);
        let scale = self.world_per_pixel(depth);
        (right * delta.x - up * delta.y) * scale
    }
}

/// Projection backed by a live Bevy camera.
pub struct CameraProjection<'a> {
    pub camera: &'a Camera,
    pub transform: &'a GlobalTransform,
}

impl Projection for CameraProjection<'_> {
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        self.camera.world_to_viewport(self.transform, world).ok()
    }

    fn screen_delta_to_world_delta(&self, anchor: Vec3, delta: Vec2) -> Vec3 {
        let Some(anchor_screen) = self.world_to_screen(anchor) else {
            return Vec3::ZERO;
        };
        let Ok(ray) = self
            .camera
            .viewport_to_world(self.transform, anchor_screen + delta)
        else {
            return Vec3::ZERO;
        };
        let plane = InfinitePlane3d {
            normal: self.transform.forward(),
        };
        match ray.intersect_plane(anchor, plane) {
            Some(distance) => ray.get_point(distance) - anchor,
            None => Vec3::ZERO,
        }
    }
}

/// Projection for a mesh in entity-local space, wrapping a world-space projection.
pub struct LocalProjection<'a, P> {
    pub world: &'a P,
    pub local_to_world: &'a GlobalTransform,
}

impl<P: Projection> Projection for LocalProjection<'_, P> {
    fn world_to_screen(&self, local: Vec3) -> Option<Vec2> {
        self.world
            .world_to_screen(self.local_to_world.transform_point(local))
    }

    fn screen_delta_to_world_delta(&self, anchor: Vec3, delta: Vec2) -> Vec3 {
        let affine = self.local_to_world.affine();
        let world_delta = self
            .world
            .screen_delta_to_world_delta(affine.transform_point3(anchor), delta);
        affine.inverse().transform_vector3(world_delta)
    }
}

/// Orthographic top-down mapping used by tests: world (x, y) scaled to pixels,
/// screen y pointing down.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct TopDownProjection {
    pub pixels_per_unit: f32,
}

#[cfg(test)]
impl Projection for TopDownProjection {
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        Some(Vec2::new(world.x, -world.y) * self.pixels_per_unit)
    }

    fn screen_delta_to_world_delta(&self, _anchor: Vec3, delta: Vec2) -> Vec3 {
        Vec3::new(delta.x, -delta.y, 0.0) / self.pixels_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_camera() -> LookAtProjection {
        LookAtProjection::new(
            ScreenRect::new(800.0, 600.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
        )
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let proj = front_camera();
        let center = proj.world_to_screen(Vec3::ZERO).expect("visible");
        assert!((center - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn screen_y_points_down() {
        let proj = front_camera();
        let above = proj.world_to_screen(Vec3::new(0.0, 1.0, 0.0)).expect("visible");
        assert!(above.y < 300.0);
        let right = proj.world_to_screen(Vec3::new(1.0, 0.0, 0.0)).expect("visible");
        assert!(right.x > 400.0);
    }

    #[test]
    fn points_behind_camera_are_rejected() {
        let proj = front_camera();
        assert!(proj.world_to_screen(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn screen_delta_round_trips_at_anchor_depth() {
        let proj = front_camera();
        let anchor = Vec3::ZERO;
        let delta = proj.screen_delta_to_world_delta(anchor, Vec2::new(40.0, 0.0));
        let moved = proj.world_to_screen(anchor + delta).expect("visible");
        assert!((moved - Vec2::new(440.0, 300.0)).length() < 0.05);
    }

    #[test]
    fn local_projection_applies_entity_transform() {
        let top = TopDownProjection { pixels_per_unit: 10.0 };
        let transform = GlobalTransform::from(Transform::from_xyz(2.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        let local = LocalProjection {
            world: &top,
            local_to_world: &transform,
        };
        let screen = local.world_to_screen(Vec3::new(1.0, 1.0, 0.0)).expect("visible");
        assert!((screen - Vec2::new(40.0, -20.0)).length() < 1e-4);
        // Ten pixels is one world unit, half a local unit at scale 2.
        let delta = local.screen_delta_to_world_delta(Vec3::ZERO, Vec2::new(10.0, 0.0));
        assert!((delta - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }
}
