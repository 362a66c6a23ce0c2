//! Movement state flags, footing classification and the wall-jump timer.

use serde::{Deserialize, Serialize};

use crate::math::slope_angle;
use crate::sensing::RayHit;

/// Coarse movement state reported to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    Grounded,
    Airborne,
    Landing,
    WallHanging,
    JumpingOffWallCooldown,
}

/// What the ground probe found under the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Footing {
    #[default]
    Airborne,
    /// Walkable, flat enough that gravity stays on
    Level,
    /// Walkable incline; gravity is held off so the character does not creep downhill
    Incline,
    /// Contact, but steeper than the walkable limit
    Steep,
}

impl Footing {
    pub fn classify(ground: Option<&RayHit>, max_slope_angle: f32, hold_angle: f32) -> Self {
        let Some(hit) = ground else {
            return Footing::Airborne;
        };
        let angle = slope_angle(hit.normal);
        if angle > max_slope_angle {
            Footing::Steep
        } else if angle > hold_angle {
            Footing::Incline
        } else {
            Footing::Level
        }
    }

    pub fn is_walkable(self) -> bool {
        matches!(self, Footing::Level | Footing::Incline)
    }

    pub fn has_contact(self) -> bool {
        self != Footing::Airborne
    }
}

/// Flags owned by the locomotion controller, rewritten once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovementState {
    pub grounded: bool,
    pub is_hanging: bool,
    pub is_landing: bool,
    pub is_jumping_off_wall: bool,
    pub move_speed_smoothed: f32,
    pub footing: Footing,
}

impl MovementState {
    pub fn mode(&self) -> MovementMode {
        if self.is_hanging {
            MovementMode::WallHanging
        } else if self.is_landing {
            MovementMode::Landing
        } else if self.is_jumping_off_wall && !self.grounded {
            MovementMode::JumpingOffWallCooldown
        } else if self.grounded {
            MovementMode::Grounded
        } else {
            MovementMode::Airborne
        }
    }
}

/// Wall-hang eligibility: all four conditions must hold at once.
pub fn can_hang(running: bool, grounded: bool, wall_in_reach: bool, cooldown_active: bool) -> bool {
    running && !grounded && wall_in_reach && !cooldown_active
}

/// Countdown that suppresses wall-hang after a wall jump.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallJumpCooldown {
    remaining: Option<f32>,
}

impl WallJumpCooldown {
    /// Start the countdown. Returns false, and changes nothing, while already running.
    pub fn start(&mut self, duration: f32) -> bool {
        if self.is_active() {
            return false;
        }
        self.remaining = Some(duration.max(0.0));
        true
    }

    /// Advance by `dt`. Returns true on the tick that clears the suppression.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(remaining);
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.unwrap_or(0.0)
    }
}
