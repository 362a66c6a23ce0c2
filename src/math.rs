//! Vector and rotation helpers shared by the locomotion, IK and camera code.
//!
//! Conventions: world up is +Y, a body's forward is its local -Z and its
//! right is local +X. Angles exchanged with config or animation are degrees.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::BLEND_REFERENCE_HZ;

/// Clamp the XZ magnitude of `velocity` to `max_speed`, keeping Y untouched.
pub fn clamp_horizontal_speed(velocity: Vec3, max_speed: f32) -> Vec3 {
    let flat = Vec3::new(velocity.x, 0.0, velocity.z);
    let speed = flat.length();
    if speed > max_speed {
        let limited = flat * (max_speed / speed);
        Vec3::new(limited.x, velocity.y, limited.z)
    } else {
        velocity
    }
}

/// Unsigned angle in degrees between two vectors, 0 for degenerate input.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let denominator = (a.length_squared() * b.length_squared()).sqrt();
    if denominator < 1e-15 {
        return 0.0;
    }
    let cos = (a.dot(b) / denominator).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Angle in degrees between world up and a surface normal.
pub fn slope_angle(normal: Vec3) -> f32 {
    angle_between(Vec3::Y, normal)
}

/// Linear interpolation with `t` clamped to [0, 1].
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Critically damped approach of `current` toward `target`.
///
/// `velocity` carries state between calls. The result never overshoots the
/// target; a zero `dt` leaves `current` where it is.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let output = target + (change + temp) * exp;

    if (target - current).dot(output - target) > 0.0 {
        *velocity = Vec3::ZERO;
        return target;
    }
    output
}

/// Scalar form of [`smooth_damp`].
pub fn smooth_damp_f32(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        return target;
    }
    output
}

/// Yaw-only part of a rotation.
pub fn yaw_of(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

/// Yaw rotation whose forward (-Z) points along the XZ projection of `direction`.
pub fn flat_look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < 1e-8 {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Camera orbit rotation from pitch/yaw in degrees.
///
/// Positive yaw turns right, positive pitch looks down.
pub fn orbit_rotation(pitch: f32, yaw: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, -yaw.to_radians(), -pitch.to_radians(), 0.0)
}

/// How per-frame blend rates are turned into interpolation factors.
///
/// The IK and animation blends were tuned as fixed fractions per update.
/// `FixedStep` keeps that literally; `FrameRateScaled` treats the rate as
/// tuned for `reference_hz` updates per second and rescales it by `dt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlendTiming {
    FixedStep,
    FrameRateScaled { reference_hz: f32 },
}

impl Default for BlendTiming {
    fn default() -> Self {
        BlendTiming::FrameRateScaled {
            reference_hz: BLEND_REFERENCE_HZ,
        }
    }
}

impl BlendTiming {
    /// Interpolation factor for a per-update `rate` over a frame of `dt` seconds.
    pub fn factor(&self, rate: f32, dt: f32) -> f32 {
        let rate = rate.clamp(0.0, 1.0);
        match *self {
            BlendTiming::FixedStep => rate,
            BlendTiming::FrameRateScaled { reference_hz } => {
                if rate >= 1.0 {
                    return 1.0;
                }
                let steps = (dt * reference_hz).max(0.0);
                1.0 - (1.0 - rate).powf(steps)
            }
        }
    }

    /// Blend `current` toward `target` by this timing's factor.
    pub fn blend(&self, current: f32, target: f32, rate: f32, dt: f32) -> f32 {
        lerp(current, target, self.factor(rate, dt))
    }
}
