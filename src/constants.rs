//! Centralized character constants.
//!
//! Default tunables for the locomotion controller, IK director and follow
//! camera, plus the animator channel names shared with the host animation
//! graph. Config structs take their `Default` values from here.

// =====================================================
// Locomotion
// =====================================================

/// Walk speed (target speed units while the run modifier is released)
pub const WALK_SPEED: f32 = 6.0;

/// Run speed (target speed units while the run modifier is held)
pub const RUN_SPEED: f32 = 12.0;

/// Horizontal (XZ) speed cap
pub const MAX_SPEED: f32 = 20.0;

/// Linear drag while grounded or wall-hanging
pub const GROUND_DRAG: f32 = 5.0;

/// Linear drag while airborne
pub const AIR_DRAG: f32 = 1.75;

/// Jump height; impulse magnitude is sqrt(2 * JUMP_HEIGHT)
pub const JUMP_HEIGHT: f32 = 1.0;

/// Steepest walkable slope in degrees
pub const MAX_SLOPE_ANGLE: f32 = 60.0;

/// Inclines steeper than this (degrees) disable gravity while grounded
pub const SLOPE_HOLD_ANGLE: f32 = 5.0;

/// Movement force multiplier while airborne
pub const AIR_MULTIPLIER: f32 = 0.3;

/// Force applied per unit of target speed
pub const MOVE_FORCE_GAIN: f32 = 10.0;

/// Forward wall probe range
pub const WALL_REACH_RANGE: f32 = 2.0;

/// Height of the forward wall probe above the character origin
pub const WALL_PROBE_HEIGHT: f32 = 2.0;

/// Length of the downward ground probe
pub const GROUND_PROBE_DISTANCE: f32 = 0.2;

/// Seconds during which wall-hang stays suppressed after a wall jump
pub const WALL_JUMP_COOLDOWN: f32 = 1.0;

/// Facing slerp rate; per-frame factor is TURN_SPEED * dt
pub const TURN_SPEED: f32 = 0.1;

/// Per-frame blend rate of the smoothed move-speed animator channel
pub const MOVE_SPEED_BLEND: f32 = 0.1;

/// Damp time (seconds) for the Horizontal/Vertical animator channels
pub const ANIMATOR_DAMP_TIME: f32 = 0.1;

/// Vertical position below which the character is returned to spawn
pub const FALL_LIMIT: f32 = -215.0;

// =====================================================
// Limb / gaze IK
// =====================================================

pub const ARM_RAY_DISTANCE: f32 = 5.0;
pub const ARM_PROBE_HEIGHT: f32 = 2.0;
pub const REACH_MULTIPLIER: f32 = 2.0;
pub const LOOK_AT_HEIGHT: f32 = 1.5;
pub const LOOK_AT_WEIGHT_MULTIPLIER: f32 = 0.9;
pub const ARM_IK_STRENGTH: f32 = 0.5;
pub const REACH_ARM_IK_WEIGHT: f32 = 0.8;
pub const REACH_ARM_SPEED: f32 = 0.01;
pub const WALL_TOUCH_RATE: f32 = 0.1;

// =====================================================
// Follow camera
// =====================================================

pub const MOUSE_SENSITIVITY: f32 = 10.0;
pub const CAMERA_DISTANCE: f32 = 2.0;
pub const CAMERA_MAX_EXTRA_DISTANCE: f32 = 2.0;
pub const CAMERA_SPEED_BLEND: f32 = 0.1;
pub const PITCH_MIN: f32 = -40.0;
pub const PITCH_MAX: f32 = 85.0;
pub const ROTATION_SMOOTH_TIME: f32 = 0.12;
pub const CUTOUT_FALLOFF: f32 = 0.2;
pub const CUTOUT_SIZE: f32 = 0.5;
/// Orbit pivot height above the character origin
pub const CAMERA_TARGET_HEIGHT: f32 = 1.6;

// =====================================================
// Blending
// =====================================================

/// Update rate at which the per-frame blend rates were tuned
pub const BLEND_REFERENCE_HZ: f32 = 50.0;

// =====================================================
// Animator channels
// =====================================================

pub const ANIM_MOVE_SPEED: &str = "MoveSpeed";
pub const ANIM_HORIZONTAL: &str = "Horizontal";
pub const ANIM_VERTICAL: &str = "Vertical";
pub const ANIM_IS_FALLING: &str = "IsFalling";
pub const ANIM_CAN_HANG: &str = "CanHang";
pub const ANIM_JUMP: &str = "Jump";
