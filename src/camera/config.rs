use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::engine::config::{ensure, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees per unit of look input
    pub mouse_sensitivity: f32,
    /// Follow distance at rest
    pub distance: f32,
    /// Extra follow distance at full character speed
    pub max_extra_distance: f32,
    /// Per-update blend rate of the speed-based distance offset
    pub speed_blend: f32,
    /// Pitch limits in degrees; positive looks down
    pub pitch_min: f32,
    pub pitch_max: f32,
    pub rotation_smooth_time: f32,
    /// Grab and hide the cursor at startup
    pub lock_cursor: bool,
    pub cutout_falloff: f32,
    pub cutout_size: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: MOUSE_SENSITIVITY,
            distance: CAMERA_DISTANCE,
            max_extra_distance: CAMERA_MAX_EXTRA_DISTANCE,
            speed_blend: CAMERA_SPEED_BLEND,
            pitch_min: PITCH_MIN,
            pitch_max: PITCH_MAX,
            rotation_smooth_time: ROTATION_SMOOTH_TIME,
            lock_cursor: true,
            cutout_falloff: CUTOUT_FALLOFF,
            cutout_size: CUTOUT_SIZE,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.pitch_min < self.pitch_max, "camera.pitch_min", "must be below pitch_max")?;
        ensure(
            (-90.0..=90.0).contains(&self.pitch_min) && (-90.0..=90.0).contains(&self.pitch_max),
            "camera.pitch_max",
            "pitch limits must be within -90..=90",
        )?;
        ensure(self.distance >= 0.0, "camera.distance", "must not be negative")?;
        ensure(
            self.max_extra_distance >= 0.0,
            "camera.max_extra_distance",
            "must not be negative",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.speed_blend),
            "camera.speed_blend",
            "must be within 0..=1",
        )?;
        ensure(
            self.rotation_smooth_time >= 0.0,
            "camera.rotation_smooth_time",
            "must not be negative",
        )?;
        ensure(self.cutout_size >= 0.0, "camera.cutout_size", "must not be negative")
    }
}
