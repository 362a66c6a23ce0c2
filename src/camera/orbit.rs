//! Mouse-orbit follow camera that backs off as the character speeds up.

use bevy::prelude::*;

use super::config::CameraConfig;
use crate::locomotion::LocomotionView;
use crate::math::{orbit_rotation, smooth_damp, BlendTiming};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Point the camera orbits and looks at
    pub target: Vec3,
    pub target_velocity: Vec3,
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub distance: f32,
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

#[derive(Component, Debug, Clone)]
pub struct FollowCamera {
    config: CameraConfig,
    blend: BlendTiming,
    /// Requested angles in degrees (x = pitch, y = yaw)
    requested: Vec2,
    /// Smoothed angles actually shown
    current: Vec3,
    angular_velocity: Vec3,
    speed_offset: f32,
}

impl FollowCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            blend: BlendTiming::default(),
            requested: Vec2::ZERO,
            current: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            speed_offset: 0.0,
        }
    }

    pub fn with_blend(mut self, blend: BlendTiming) -> Self {
        self.blend = blend;
        self
    }

    /// Start looking along the given yaw (degrees) without easing in.
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.requested.y = yaw;
        self.current.y = yaw;
        self
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn reconfigure(&mut self, config: CameraConfig, blend: BlendTiming) {
        self.config = config;
        self.blend = blend;
        self.requested.x = self.requested.x.clamp(config.pitch_min, config.pitch_max);
    }

    pub fn pitch(&self) -> f32 {
        self.requested.x
    }

    pub fn yaw(&self) -> f32 {
        self.requested.y
    }

    pub fn speed_offset(&self) -> f32 {
        self.speed_offset
    }

    /// Apply look input. x turns, y tilts (positive up).
    pub fn look(&mut self, delta: Vec2) {
        let sensitivity = self.config.mouse_sensitivity;
        self.requested.y += delta.x * sensitivity;
        self.requested.x -= delta.y * sensitivity;
        self.requested.x = self.requested.x.clamp(self.config.pitch_min, self.config.pitch_max);
    }

    pub fn step(&mut self, frame: &CameraFrame, locomotion: &impl LocomotionView) -> CameraPose {
        let cfg = self.config;
        let target_angles = Vec3::new(self.requested.x, self.requested.y, 0.0);
        self.current = smooth_damp(
            self.current,
            target_angles,
            &mut self.angular_velocity,
            cfg.rotation_smooth_time,
            frame.dt,
        );
        let rotation = orbit_rotation(self.current.x, self.current.y);

        let max_speed = locomotion.max_speed();
        let speed_fraction = if max_speed > 0.0 {
            frame.target_velocity.length().min(max_speed) / max_speed
        } else {
            0.0
        };
        self.speed_offset = self
            .blend
            .blend(self.speed_offset, speed_fraction, cfg.speed_blend, frame.dt);

        let distance = cfg.distance + self.speed_offset * cfg.max_extra_distance;
        CameraPose {
            position: frame.target - rotation * Vec3::NEG_Z * distance,
            rotation,
            distance,
        }
    }
}
