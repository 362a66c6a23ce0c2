//! Engine-agnostic locomotion decision logic.
//!
//! The controller never touches a physics body directly. Each frame it is
//! handed a [`BodySnapshot`] plus probe results and answers with
//! [`BodyCommands`] and [`AnimatorParams`] for the host to apply.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::LocomotionConfig;
use crate::constants::{ANIM_CAN_HANG, ANIM_HORIZONTAL, ANIM_IS_FALLING, ANIM_JUMP, ANIM_MOVE_SPEED, ANIM_VERTICAL};
use super::state::{can_hang, Footing, MovementMode, MovementState, WallJumpCooldown};
use crate::math::{clamp_horizontal_speed, flat_look_rotation, smooth_damp_f32, yaw_of, BlendTiming};
use crate::sensing::{Probe, RayHit, RaycastQuery};

/// Player intent for one frame.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionInput {
    /// Raw axes: x = strafe right, y = forward
    pub direction: Vec2,
    pub run: bool,
    /// Jump pressed this frame
    pub jump: bool,
}

/// Rigid-body state as seen at the start of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
}

impl BodySnapshot {
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionFrame {
    pub input: LocomotionInput,
    pub body: BodySnapshot,
    /// World rotation of the follow camera
    pub camera_rotation: Quat,
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionProbes {
    pub ground: Probe,
    pub wall: Probe,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionSensors {
    pub ground: Option<RayHit>,
    pub wall: Option<RayHit>,
}

/// What the host must do to the rigid body this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyCommands {
    /// Continuous force for this frame
    pub force: Vec3,
    /// One-shot impulse
    pub impulse: Vec3,
    pub drag: f32,
    pub gravity_enabled: bool,
    /// Velocity override, set when the speed clamp or the safety net kicked in
    pub velocity: Option<Vec3>,
    /// Position override, set by the safety net
    pub teleport: Option<Vec3>,
    pub rotation: Quat,
}

/// Animation channels driven by locomotion.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimatorParams {
    pub move_speed: f32,
    pub horizontal: f32,
    pub vertical: f32,
    pub is_falling: bool,
    pub can_hang: bool,
    /// One-shot jump trigger
    pub jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimatorValue {
    Float(f32),
    Bool(bool),
    Trigger,
}

impl AnimatorParams {
    /// Parameters keyed by animator channel name. `Jump` appears only on the frame it fires.
    pub fn channels(&self) -> Vec<(&'static str, AnimatorValue)> {
        let mut channels = vec![
            (ANIM_MOVE_SPEED, AnimatorValue::Float(self.move_speed)),
            (ANIM_HORIZONTAL, AnimatorValue::Float(self.horizontal)),
            (ANIM_VERTICAL, AnimatorValue::Float(self.vertical)),
            (ANIM_IS_FALLING, AnimatorValue::Bool(self.is_falling)),
            (ANIM_CAN_HANG, AnimatorValue::Bool(self.can_hang)),
        ];
        if self.jump {
            channels.push((ANIM_JUMP, AnimatorValue::Trigger));
        }
        channels
    }
}

/// Notable transitions, for logging and gameplay hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocomotionEvent {
    Jumped,
    WallHangStarted,
    WallHangEnded,
    WallJumped,
    WallJumpCooldownCleared,
    Respawned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionOutput {
    pub body: BodyCommands,
    pub animator: AnimatorParams,
    pub mode: MovementMode,
    pub events: Vec<LocomotionEvent>,
}

/// Read-only view of locomotion state for the IK director and camera.
pub trait LocomotionView {
    fn is_hanging(&self) -> bool;
    fn is_grounded(&self) -> bool;
    fn wall_hit(&self) -> Option<&RayHit>;
    fn max_speed(&self) -> f32;
    fn mode(&self) -> MovementMode;
}

/// Locomotion state reported by a host that runs its own controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedLocomotion {
    pub hanging: bool,
    pub grounded: bool,
    pub max_speed: f32,
    pub wall_hit: Option<RayHit>,
}

impl LocomotionView for ObservedLocomotion {
    fn is_hanging(&self) -> bool {
        self.hanging
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn wall_hit(&self) -> Option<&RayHit> {
        self.wall_hit.as_ref()
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn mode(&self) -> MovementMode {
        if self.hanging {
            MovementMode::WallHanging
        } else if self.grounded {
            MovementMode::Grounded
        } else {
            MovementMode::Airborne
        }
    }
}

/// Impulse magnitude for a jump of `height`.
pub fn jump_velocity(height: f32) -> f32 {
    (2.0 * height.max(0.0)).sqrt()
}

#[derive(Component, Debug, Clone)]
pub struct LocomotionController {
    config: LocomotionConfig,
    blend: BlendTiming,
    state: MovementState,
    cooldown: WallJumpCooldown,
    spawn_position: Vec3,
    wall_hit: Option<RayHit>,
    animator: AnimatorParams,
    horizontal_rate: f32,
    vertical_rate: f32,
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig, spawn_position: Vec3) -> Self {
        Self {
            config,
            blend: BlendTiming::default(),
            state: MovementState::default(),
            cooldown: WallJumpCooldown::default(),
            spawn_position,
            wall_hit: None,
            animator: AnimatorParams::default(),
            horizontal_rate: 0.0,
            vertical_rate: 0.0,
        }
    }

    pub fn with_blend(mut self, blend: BlendTiming) -> Self {
        self.blend = blend;
        self
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Swap in new tunables; movement state is kept.
    pub fn reconfigure(&mut self, config: LocomotionConfig, blend: BlendTiming) {
        self.config = config;
        self.blend = blend;
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    pub fn set_spawn_position(&mut self, position: Vec3) {
        self.spawn_position = position;
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown.remaining()
    }

    pub fn animator(&self) -> &AnimatorParams {
        &self.animator
    }

    /// Enter the landing lockout (host animation event).
    pub fn begin_landing(&mut self) {
        self.state.is_landing = true;
    }

    /// Leave the landing lockout (host animation event).
    pub fn end_landing(&mut self) {
        self.state.is_landing = false;
    }

    pub fn ground_probe(&self, body: &BodySnapshot) -> Probe {
        Probe::new(body.position, Vec3::NEG_Y, self.config.ground_probe_distance)
    }

    pub fn wall_probe(&self, body: &BodySnapshot) -> Probe {
        Probe::new(
            body.position + Vec3::Y * self.config.wall_probe_height,
            body.forward(),
            self.config.wall_reach_range,
        )
    }

    pub fn probes(&self, body: &BodySnapshot) -> LocomotionProbes {
        LocomotionProbes {
            ground: self.ground_probe(body),
            wall: self.wall_probe(body),
        }
    }

    pub fn sense(&self, world: &impl RaycastQuery, body: &BodySnapshot) -> LocomotionSensors {
        let probes = self.probes(body);
        LocomotionSensors {
            ground: world.cast(&probes.ground),
            wall: world.cast(&probes.wall),
        }
    }

    /// Sense through `world`, then [`step`](Self::step).
    pub fn update(&mut self, world: &impl RaycastQuery, frame: &LocomotionFrame) -> LocomotionOutput {
        let sensors = self.sense(world, &frame.body);
        self.step(frame, &sensors)
    }

    pub fn step(&mut self, frame: &LocomotionFrame, sensors: &LocomotionSensors) -> LocomotionOutput {
        let cfg = self.config;
        let dt = frame.dt.max(0.0);
        let mut events = Vec::new();

        if self.cooldown.tick(dt) {
            debug!("wall-jump cooldown elapsed");
            events.push(LocomotionEvent::WallJumpCooldownCleared);
        }

        let raw = frame.input.direction;
        let direction = raw.normalize_or_zero();
        let running = frame.input.run;

        let footing = Footing::classify(sensors.ground.as_ref(), cfg.max_slope_angle, cfg.slope_hold_angle);
        // Any contact counts as grounded; steepness only affects force and gravity
        let grounded = footing.has_contact();
        let landing = self.state.is_landing;
        let was_hanging = self.state.is_hanging;
        let hanging = can_hang(running, grounded, sensors.wall.is_some(), self.cooldown.is_active());
        self.wall_hit = sensors.wall;

        let jump_speed = jump_velocity(cfg.jump_height);
        let mut body = BodyCommands {
            force: Vec3::ZERO,
            impulse: Vec3::ZERO,
            drag: cfg.air_drag,
            gravity_enabled: true,
            velocity: None,
            teleport: None,
            rotation: frame.body.rotation,
        };
        let mut jumped = false;

        if hanging {
            body.gravity_enabled = false;
            if frame.input.jump && self.cooldown.start(cfg.wall_jump_cooldown) {
                let camera_forward = (frame.camera_rotation * Vec3::NEG_Z).normalize_or_zero();
                body.impulse = Vec3::Y * jump_speed + camera_forward * jump_speed;
                debug!(cooldown = cfg.wall_jump_cooldown, "jumped off wall");
                events.push(LocomotionEvent::WallJumped);
            }
        } else {
            body.gravity_enabled = footing != Footing::Incline;
            body.force = self.movement_force(direction, running, footing, landing, frame.body.rotation);

            let clamped = clamp_horizontal_speed(frame.body.velocity, cfg.max_speed);
            if clamped != frame.body.velocity {
                body.velocity = Some(clamped);
            }

            if frame.input.jump && grounded && !landing {
                body.impulse = Vec3::Y * jump_speed;
                jumped = true;
                events.push(LocomotionEvent::Jumped);
            }
        }

        if (grounded && !landing) || hanging {
            body.drag = cfg.ground_drag;
        }

        let turn = (cfg.turn_speed * dt).clamp(0.0, 1.0);
        if !landing && !hanging {
            body.rotation = frame.body.rotation.slerp(yaw_of(frame.camera_rotation), turn);
        } else if landing {
            if let Some(target) = flat_look_rotation(frame.body.velocity) {
                body.rotation = frame.body.rotation.slerp(target, turn);
            }
        }

        match (was_hanging, hanging) {
            (false, true) => {
                debug!("wall-hang started");
                events.push(LocomotionEvent::WallHangStarted);
            }
            (true, false) => {
                debug!("wall-hang ended");
                events.push(LocomotionEvent::WallHangEnded);
            }
            _ => {}
        }

        self.update_animator(raw, direction, running, grounded, hanging, jumped, dt);

        if frame.body.position.y < cfg.fall_limit {
            info!(
                y = frame.body.position.y,
                limit = cfg.fall_limit,
                "character fell out of the world, returning to spawn"
            );
            body.force = Vec3::ZERO;
            body.impulse = Vec3::ZERO;
            body.velocity = Some(Vec3::ZERO);
            body.teleport = Some(self.spawn_position);
            events.push(LocomotionEvent::Respawned);
        }

        self.state.grounded = grounded;
        self.state.footing = footing;
        self.state.is_hanging = hanging;
        self.state.is_jumping_off_wall = self.cooldown.is_active();

        LocomotionOutput {
            body,
            animator: self.animator,
            mode: self.state.mode(),
            events,
        }
    }

    fn movement_force(
        &self,
        direction: Vec2,
        running: bool,
        footing: Footing,
        landing: bool,
        rotation: Quat,
    ) -> Vec3 {
        if landing || direction == Vec2::ZERO {
            return Vec3::ZERO;
        }
        let control = match footing {
            Footing::Level | Footing::Incline => 1.0,
            Footing::Airborne => self.config.air_multiplier,
            Footing::Steep => return Vec3::ZERO,
        };
        let speed = if running {
            self.config.run_speed
        } else {
            self.config.walk_speed
        };
        let world = rotation * Vec3::new(direction.x, 0.0, -direction.y);
        let flat = Vec3::new(world.x, 0.0, world.z).normalize_or_zero();
        flat * speed * self.config.move_force_gain * control
    }

    #[allow(clippy::too_many_arguments)]
    fn update_animator(
        &mut self,
        raw: Vec2,
        direction: Vec2,
        running: bool,
        grounded: bool,
        hanging: bool,
        jumped: bool,
        dt: f32,
    ) {
        let multiplier = if running { 2.0 } else { 1.0 };
        let moving = if direction != Vec2::ZERO { 1.0 } else { 0.0 };
        self.state.move_speed_smoothed =
            self.blend
                .blend(self.state.move_speed_smoothed, moving, self.config.move_speed_blend, dt);

        let damp = self.config.animator_damp_time;
        let horizontal = smooth_damp_f32(
            self.animator.horizontal,
            raw.x * multiplier,
            &mut self.horizontal_rate,
            damp,
            dt,
        );
        let vertical = smooth_damp_f32(
            self.animator.vertical,
            raw.y * multiplier,
            &mut self.vertical_rate,
            damp,
            dt,
        );

        self.animator = AnimatorParams {
            move_speed: self.state.move_speed_smoothed * multiplier,
            horizontal,
            vertical,
            is_falling: !grounded,
            can_hang: hanging,
            jump: jumped,
        };
    }
}

impl LocomotionView for LocomotionController {
    fn is_hanging(&self) -> bool {
        self.state.is_hanging
    }

    fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    fn wall_hit(&self) -> Option<&RayHit> {
        self.wall_hit.as_ref()
    }

    fn max_speed(&self) -> f32 {
        self.config.max_speed
    }

    fn mode(&self) -> MovementMode {
        self.state.mode()
    }
}
