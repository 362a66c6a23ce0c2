//! Hand reach and gaze targets for a full-body IK rig.
//!
//! The director only decides targets and weights. Solving the skeleton is
//! left to whatever IK solver the host runs on top of [`IkRig`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::IkConfig;
use crate::locomotion::{BodySnapshot, LocomotionView};
use crate::math::{angle_between, BlendTiming};
use crate::sensing::{Probe, RayHit, RaycastQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandEffector {
    pub position: Vec3,
    pub position_weight: f32,
    pub rotation: Quat,
    pub rotation_weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GazeTarget {
    pub position: Vec3,
    pub body_weight: f32,
    pub head_weight: f32,
}

/// Effector targets read by the host IK solver.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct IkRig {
    pub left_hand: HandEffector,
    pub right_hand: HandEffector,
    pub gaze: GazeTarget,
}

impl IkRig {
    pub fn hand(&self, side: Side) -> &HandEffector {
        match side {
            Side::Left => &self.left_hand,
            Side::Right => &self.right_hand,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkFrame {
    pub body: BodySnapshot,
    pub camera_position: Vec3,
    pub camera_forward: Vec3,
    /// Current world positions of the hand bones
    pub left_bone: Vec3,
    pub right_bone: Vec3,
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmProbes {
    pub left: Probe,
    pub right: Probe,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArmSensors {
    pub left: Option<RayHit>,
    pub right: Option<RayHit>,
}

#[derive(Component, Debug, Clone)]
pub struct IkDirector {
    config: IkConfig,
    blend: BlendTiming,
    reaching: Option<Side>,
}

impl IkDirector {
    pub fn new(config: IkConfig) -> Self {
        Self {
            config,
            blend: BlendTiming::default(),
            reaching: None,
        }
    }

    pub fn with_blend(mut self, blend: BlendTiming) -> Self {
        self.blend = blend;
        self
    }

    pub fn config(&self) -> &IkConfig {
        &self.config
    }

    pub fn reconfigure(&mut self, config: IkConfig, blend: BlendTiming) {
        self.config = config;
        self.blend = blend;
    }

    /// Hand reaching for the gaze target, while hanging.
    pub fn reaching_side(&self) -> Option<Side> {
        self.reaching
    }

    pub fn probes(&self, body: &BodySnapshot) -> ArmProbes {
        let origin = body.position + Vec3::Y * self.config.arm_probe_height;
        let right = body.rotation * Vec3::X;
        ArmProbes {
            left: Probe::new(origin, -right, self.config.arm_ray_distance),
            right: Probe::new(origin, right, self.config.arm_ray_distance),
        }
    }

    pub fn sense(&self, world: &impl RaycastQuery, body: &BodySnapshot) -> ArmSensors {
        let probes = self.probes(body);
        ArmSensors {
            left: world.cast(&probes.left),
            right: world.cast(&probes.right),
        }
    }

    /// Sense through `world` (skipped while hanging), then [`step`](Self::step).
    pub fn update(
        &mut self,
        rig: &mut IkRig,
        world: &impl RaycastQuery,
        frame: &IkFrame,
        locomotion: &impl LocomotionView,
    ) {
        let sensors = if locomotion.is_hanging() {
            ArmSensors::default()
        } else {
            self.sense(world, &frame.body)
        };
        self.step(rig, frame, &sensors, locomotion);
    }

    pub fn step(
        &mut self,
        rig: &mut IkRig,
        frame: &IkFrame,
        sensors: &ArmSensors,
        locomotion: &impl LocomotionView,
    ) {
        if locomotion.is_hanging() {
            self.reach_toward_camera(rig, frame);
        } else {
            if self.reaching.take().is_some() {
                debug!("hand reach released");
            }
            self.touch_walls(rig, frame, sensors);
        }
    }

    fn reach_toward_camera(&mut self, rig: &mut IkRig, frame: &IkFrame) {
        let cfg = self.config;
        let position = frame.body.position;

        let angle = angle_between(frame.body.forward(), position - frame.camera_position);
        let local = frame.body.rotation.inverse() * (frame.camera_position - position);
        let side = if local.x < 0.0 { Side::Right } else { Side::Left };
        if self.reaching != Some(side) {
            debug!(?side, "reaching toward camera");
            self.reaching = Some(side);
        }

        let target = position + Vec3::Y * cfg.look_at_height + frame.camera_forward * cfg.reach_multiplier;
        let weight = angle.abs() / 180.0 * cfg.look_at_weight_multiplier;
        rig.gaze = GazeTarget {
            position: target,
            body_weight: weight,
            head_weight: weight,
        };

        let IkRig {
            left_hand,
            right_hand,
            ..
        } = rig;
        let (reaching, idle, idle_bone) = match side {
            Side::Right => (right_hand, left_hand, frame.left_bone),
            Side::Left => (left_hand, right_hand, frame.right_bone),
        };
        reaching.position = target;
        reaching.position_weight = weight;
        idle.position = idle_bone;
        idle.position_weight = self.blend.blend(
            idle.position_weight,
            cfg.reach_arm_ik_weight,
            cfg.reach_arm_speed,
            frame.dt,
        );
    }

    fn touch_walls(&self, rig: &mut IkRig, frame: &IkFrame, sensors: &ArmSensors) {
        let cfg = self.config;
        rig.gaze.body_weight = 0.0;
        rig.gaze.head_weight = 0.0;

        let right = &mut rig.right_hand;
        match sensors.right {
            Some(hit) => {
                right.position = hit.point;
                right.position_weight =
                    self.blend
                        .blend(right.position_weight, cfg.arm_ik_strength, cfg.wall_touch_rate, frame.dt);
                right.rotation = palm_rotation(hit.normal);
            }
            None => {
                right.position_weight =
                    self.blend
                        .blend(right.position_weight, 0.0, cfg.wall_touch_rate, frame.dt);
            }
        }
        right.rotation_weight = right.position_weight;

        let left = &mut rig.left_hand;
        match sensors.left {
            Some(hit) => {
                left.position = hit.point;
                left.position_weight =
                    self.blend
                        .blend(left.position_weight, cfg.arm_ik_strength, cfg.wall_touch_rate, frame.dt);
            }
            None => {
                left.position_weight = self.blend.blend(left.position_weight, 0.0, cfg.wall_touch_rate, frame.dt);
            }
        }
    }
}

/// Rotation laying the right palm against a wall with the given normal.
fn palm_rotation(normal: Vec3) -> Quat {
    let axis = normal.cross(Vec3::X);
    if axis.length_squared() < 1e-8 || normal.length_squared() < 1e-8 {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(axis.normalize(), normal.normalize())
}
