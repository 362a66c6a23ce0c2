//! See-through cutout for geometry between the camera and its target.
//!
//! Each frame every environment surface crossing the camera→target segment
//! receives the target's viewport position plus falloff/size, which a
//! material can use to carve a hole around the character.

use bevy::prelude::*;

use super::config::CameraConfig;
use crate::sensing::{Probe, RayHit, RaycastQuery};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CutoutParams {
    /// Viewport position of the target, y divided by the screen ratio divisor
    pub position: Vec3,
    pub falloff: f32,
    pub size: f32,
}

/// World to viewport mapping of the active camera.
pub trait ViewportProjection {
    /// x, y in 0..1 from the bottom-left corner, z = view depth.
    fn world_to_viewport(&self, world: Vec3) -> Vec3;

    /// Viewport size in pixels.
    fn viewport_size(&self) -> UVec2;
}

/// Whole-number width / height, at least 1.
///
/// Integer division: every landscape ratio under 2:1 yields 1, 21:9 yields 2.
pub fn screen_ratio_divisor(size: UVec2) -> u32 {
    if size.y == 0 {
        return 1;
    }
    (size.x / size.y).max(1)
}

/// Receives cutout parameters for each occluding surface.
pub trait CutoutSink {
    fn set_cutout(&mut self, hit: &RayHit, params: &CutoutParams);
}

impl CutoutSink for Vec<(RayHit, CutoutParams)> {
    fn set_cutout(&mut self, hit: &RayHit, params: &CutoutParams) {
        self.push((*hit, *params));
    }
}

/// Perspective projection given as matrices, as a Bevy camera exposes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixProjection {
    pub clip_from_view: Mat4,
    pub world_from_view: Mat4,
    pub viewport_size: UVec2,
}

impl MatrixProjection {
    /// Right-handed infinite reverse-z perspective looking down -Z, as Bevy builds it.
    pub fn perspective(fov_y_radians: f32, viewport_size: UVec2, near: f32, world_from_view: Mat4) -> Self {
        let aspect_ratio = viewport_size.x.max(1) as f32 / viewport_size.y.max(1) as f32;
        Self {
            clip_from_view: Mat4::perspective_infinite_reverse_rh(fov_y_radians, aspect_ratio, near),
            world_from_view,
            viewport_size,
        }
    }
}

impl ViewportProjection for MatrixProjection {
    fn world_to_viewport(&self, world: Vec3) -> Vec3 {
        let view = self.world_from_view.inverse().transform_point3(world);
        let clip = self.clip_from_view * view.extend(1.0);
        if clip.w.abs() < f32::EPSILON {
            return Vec3::new(0.5, 0.5, -view.z);
        }
        let ndc = clip.truncate() / clip.w;
        Vec3::new((ndc.x + 1.0) * 0.5, (ndc.y + 1.0) * 0.5, -view.z)
    }

    fn viewport_size(&self) -> UVec2 {
        self.viewport_size
    }
}

/// Viewport position of `target` with y divided by [`screen_ratio_divisor`].
pub fn cutout_coordinate(projection: &impl ViewportProjection, target: Vec3) -> Vec3 {
    let mut position = projection.world_to_viewport(target);
    position.y /= screen_ratio_divisor(projection.viewport_size()) as f32;
    position
}

/// Ray from the camera to the target, spanning exactly their distance.
pub fn occlusion_probe(camera: Vec3, target: Vec3) -> Probe {
    Probe::between(camera, target)
}

/// Push cutout parameters to every surface between camera and target.
///
/// `world` should only report environment geometry. Returns the number of
/// occluders found.
pub fn apply_cutout(
    world: &impl RaycastQuery,
    projection: &impl ViewportProjection,
    sink: &mut impl CutoutSink,
    camera: Vec3,
    target: Vec3,
    config: &CameraConfig,
) -> usize {
    let params = CutoutParams {
        position: cutout_coordinate(projection, target),
        falloff: config.cutout_falloff,
        size: config.cutout_size,
    };
    let hits = world.cast_all(&occlusion_probe(camera, target));
    for hit in &hits {
        sink.set_cutout(hit, &params);
    }
    hits.len()
}
