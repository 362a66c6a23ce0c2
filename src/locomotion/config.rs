use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::engine::config::{ensure, ConfigError};

/// Tunables for the locomotion controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub max_speed: f32,
    pub ground_drag: f32,
    pub air_drag: f32,
    pub jump_height: f32,
    pub max_slope_angle: f32,
    pub slope_hold_angle: f32,
    pub air_multiplier: f32,
    pub move_force_gain: f32,
    pub wall_reach_range: f32,
    pub wall_probe_height: f32,
    pub ground_probe_distance: f32,
    pub wall_jump_cooldown: f32,
    pub turn_speed: f32,
    pub move_speed_blend: f32,
    pub animator_damp_time: f32,
    pub fall_limit: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            max_speed: MAX_SPEED,
            ground_drag: GROUND_DRAG,
            air_drag: AIR_DRAG,
            jump_height: JUMP_HEIGHT,
            max_slope_angle: MAX_SLOPE_ANGLE,
            slope_hold_angle: SLOPE_HOLD_ANGLE,
            air_multiplier: AIR_MULTIPLIER,
            move_force_gain: MOVE_FORCE_GAIN,
            wall_reach_range: WALL_REACH_RANGE,
            wall_probe_height: WALL_PROBE_HEIGHT,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
            wall_jump_cooldown: WALL_JUMP_COOLDOWN,
            turn_speed: TURN_SPEED,
            move_speed_blend: MOVE_SPEED_BLEND,
            animator_damp_time: ANIMATOR_DAMP_TIME,
            fall_limit: FALL_LIMIT,
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.walk_speed >= 0.0, "locomotion.walk_speed", "must not be negative")?;
        ensure(self.run_speed >= 0.0, "locomotion.run_speed", "must not be negative")?;
        ensure(self.max_speed > 0.0, "locomotion.max_speed", "must be positive")?;
        ensure(self.ground_drag >= 0.0, "locomotion.ground_drag", "must not be negative")?;
        ensure(self.air_drag >= 0.0, "locomotion.air_drag", "must not be negative")?;
        ensure(self.jump_height >= 0.0, "locomotion.jump_height", "must not be negative")?;
        ensure(
            (0.0..=90.0).contains(&self.max_slope_angle),
            "locomotion.max_slope_angle",
            "must be within 0..=90 degrees",
        )?;
        ensure(
            self.slope_hold_angle >= 0.0 && self.slope_hold_angle <= self.max_slope_angle,
            "locomotion.slope_hold_angle",
            "must be within 0..=max_slope_angle",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.air_multiplier),
            "locomotion.air_multiplier",
            "must be within 0..=1",
        )?;
        ensure(self.move_force_gain >= 0.0, "locomotion.move_force_gain", "must not be negative")?;
        ensure(self.wall_reach_range > 0.0, "locomotion.wall_reach_range", "must be positive")?;
        ensure(
            self.ground_probe_distance > 0.0,
            "locomotion.ground_probe_distance",
            "must be positive",
        )?;
        ensure(
            self.wall_jump_cooldown >= 0.0,
            "locomotion.wall_jump_cooldown",
            "must not be negative",
        )?;
        ensure(self.turn_speed >= 0.0, "locomotion.turn_speed", "must not be negative")?;
        ensure(
            (0.0..=1.0).contains(&self.move_speed_blend),
            "locomotion.move_speed_blend",
            "must be within 0..=1",
        )?;
        ensure(
            self.animator_damp_time >= 0.0,
            "locomotion.animator_damp_time",
            "must not be negative",
        )?;
        ensure(self.fall_limit.is_finite(), "locomotion.fall_limit", "must be finite")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LocomotionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_turn_speed_default_is_slow_drift() {
        let config = LocomotionConfig::default();
        assert!((config.turn_speed - 0.1).abs() < f32::EPSILON);
        // At 60 Hz a frame turns well under one percent of the way
        assert!(config.turn_speed / 60.0 < 0.01);
    }

    #[test]
    fn test_hold_angle_above_max_rejected() {
        let config = LocomotionConfig {
            max_slope_angle: 30.0,
            slope_hold_angle: 45.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("slope_hold_angle"));
    }
}
