use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::engine::config::{ensure, ConfigError};

/// Tunables for hand reach and gaze.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkConfig {
    /// Range of the sideways arm probes
    pub arm_ray_distance: f32,
    /// Height of the arm probes above the character origin
    pub arm_probe_height: f32,
    /// How far ahead of the camera the hanging gaze/reach target sits
    pub reach_multiplier: f32,
    /// Height of the gaze target above the character origin
    pub look_at_height: f32,
    pub look_at_weight_multiplier: f32,
    /// Hand weight when resting on a nearby wall
    pub arm_ik_strength: f32,
    /// Weight the idle hand settles at while hanging
    pub reach_arm_ik_weight: f32,
    /// Per-update blend rate of the idle hand while hanging
    pub reach_arm_speed: f32,
    /// Per-update blend rate of hands touching or leaving walls
    pub wall_touch_rate: f32,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            arm_ray_distance: ARM_RAY_DISTANCE,
            arm_probe_height: ARM_PROBE_HEIGHT,
            reach_multiplier: REACH_MULTIPLIER,
            look_at_height: LOOK_AT_HEIGHT,
            look_at_weight_multiplier: LOOK_AT_WEIGHT_MULTIPLIER,
            arm_ik_strength: ARM_IK_STRENGTH,
            reach_arm_ik_weight: REACH_ARM_IK_WEIGHT,
            reach_arm_speed: REACH_ARM_SPEED,
            wall_touch_rate: WALL_TOUCH_RATE,
        }
    }
}

impl IkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.arm_ray_distance > 0.0, "ik.arm_ray_distance", "must be positive")?;
        ensure(self.reach_multiplier >= 0.0, "ik.reach_multiplier", "must not be negative")?;
        ensure(
            self.look_at_weight_multiplier >= 0.0,
            "ik.look_at_weight_multiplier",
            "must not be negative",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.arm_ik_strength),
            "ik.arm_ik_strength",
            "must be within 0..=1",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.reach_arm_ik_weight),
            "ik.reach_arm_ik_weight",
            "must be within 0..=1",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.reach_arm_speed),
            "ik.reach_arm_speed",
            "must be within 0..=1",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.wall_touch_rate),
            "ik.wall_touch_rate",
            "must be within 0..=1",
        )
    }
}
