//! End-to-end frames over an analytic world
//!
//! Drives the locomotion controller, IK director and follow camera together,
//! in frame order, the way the Bevy plugins and the bridge do.

use bevy::math::{Quat, Vec2, Vec3};

use character_core::camera::{CameraConfig, CameraFrame, FollowCamera};
use character_core::ik::{IkConfig, IkDirector, IkFrame, IkRig, Side};
use character_core::locomotion::{
    BodySnapshot, LocomotionConfig, LocomotionController, LocomotionEvent, LocomotionFrame, LocomotionInput,
    LocomotionOutput, LocomotionView, MovementMode,
};
use character_core::math::BlendTiming;
use character_core::sensing::analytic::AnalyticWorld;

const DT: f32 = 1.0 / 50.0;

struct Rig {
    locomotion: LocomotionController,
    ik: IkDirector,
    effectors: IkRig,
    camera: FollowCamera,
    body: BodySnapshot,
}

impl Rig {
    fn at(position: Vec3) -> Self {
        Self {
            locomotion: LocomotionController::new(LocomotionConfig::default(), position)
                .with_blend(BlendTiming::FixedStep),
            ik: IkDirector::new(IkConfig::default()).with_blend(BlendTiming::FixedStep),
            effectors: IkRig::default(),
            camera: FollowCamera::new(CameraConfig::default()).with_blend(BlendTiming::FixedStep),
            body: BodySnapshot::at_rest(position),
        }
    }

    /// One frame: locomotion, then IK, then camera.
    fn frame(&mut self, world: &AnalyticWorld, input: LocomotionInput) -> LocomotionOutput {
        let output = self.locomotion.update(
            world,
            &LocomotionFrame {
                input,
                body: self.body,
                camera_rotation: Quat::IDENTITY,
                dt: DT,
            },
        );

        let camera_position = self.body.position + Vec3::new(-2.0, 1.6, 2.0);
        self.ik.update(
            &mut self.effectors,
            world,
            &IkFrame {
                body: self.body,
                camera_position,
                camera_forward: (self.body.position - camera_position).normalize(),
                left_bone: self.body.position + Vec3::new(-0.4, 1.4, 0.0),
                right_bone: self.body.position + Vec3::new(0.4, 1.4, 0.0),
                dt: DT,
            },
            &self.locomotion,
        );

        self.camera.step(
            &CameraFrame {
                target: self.body.position + Vec3::Y * 1.6,
                target_velocity: self.body.velocity,
                dt: DT,
            },
            &self.locomotion,
        );

        if let Some(position) = output.body.teleport {
            self.body.position = position;
        }
        if let Some(velocity) = output.body.velocity {
            self.body.velocity = velocity;
        }
        self.body.rotation = output.body.rotation;
        output
    }
}

fn idle() -> LocomotionInput {
    LocomotionInput::default()
}

fn run_forward() -> LocomotionInput {
    LocomotionInput {
        direction: Vec2::Y,
        run: true,
        jump: false,
    }
}

/// A wall whose face sits 1.5 units in front of a character at the origin.
fn wall_ahead() -> AnalyticWorld {
    AnalyticWorld::new().with_box(Vec3::new(-5.0, -10.0, -3.0), Vec3::new(5.0, 10.0, -1.5))
}

#[test]
fn resting_on_flat_ground() {
    let world = AnalyticWorld::new().with_ground(0.0);
    let mut rig = Rig::at(Vec3::new(0.0, 0.05, 0.0));

    for _ in 0..10 {
        let output = rig.frame(&world, idle());
        assert!(rig.locomotion.is_grounded());
        assert!(!rig.locomotion.is_hanging());
        assert_eq!(output.mode, MovementMode::Grounded);
        assert_eq!(output.body.drag, LocomotionConfig::default().ground_drag);
        assert_eq!(output.body.force, Vec3::ZERO);
        assert_eq!(output.body.impulse, Vec3::ZERO);
        assert_eq!(output.body.velocity, None);
        assert!(output.body.gravity_enabled);
    }
    assert_eq!(rig.body.velocity, Vec3::ZERO);
    assert_eq!(rig.effectors.gaze.head_weight, 0.0);
}

#[test]
fn airborne_run_into_wall_starts_hanging() {
    let world = wall_ahead();
    let mut rig = Rig::at(Vec3::new(0.0, 3.0, 0.0));

    let output = rig.frame(&world, run_forward());
    assert!(rig.locomotion.is_hanging());
    assert!(!output.body.gravity_enabled);
    assert_eq!(output.mode, MovementMode::WallHanging);
    assert_eq!(output.body.drag, LocomotionConfig::default().ground_drag);
    assert!(output.animator.can_hang);
    assert!(output.events.contains(&LocomotionEvent::WallHangStarted));
    assert!(rig.locomotion.wall_hit().is_some());
}

#[test]
fn hanging_reaches_toward_camera() {
    let world = wall_ahead();
    let mut rig = Rig::at(Vec3::new(0.0, 3.0, 0.0));
    rig.frame(&world, run_forward());

    // Camera sits behind and to the left of the character
    assert_eq!(rig.ik.reaching_side(), Some(Side::Right));
    assert!(rig.effectors.gaze.head_weight > 0.0);
    assert_eq!(rig.effectors.right_hand.position, rig.effectors.gaze.position);
}

#[test]
fn wall_jump_then_cooldown_then_hang_again() {
    let world = wall_ahead();
    let mut rig = Rig::at(Vec3::new(0.0, 3.0, 0.0));
    rig.frame(&world, run_forward());
    assert!(rig.locomotion.is_hanging());

    let jump = rig.frame(
        &world,
        LocomotionInput {
            jump: true,
            ..run_forward()
        },
    );
    assert!(jump.events.contains(&LocomotionEvent::WallJumped));
    assert!(jump.body.impulse.y > 0.0);
    assert!(jump.body.impulse.z < 0.0, "pushed along camera forward");
    assert!(rig.locomotion.cooldown_remaining() > 0.0);

    // Still in reach of the wall, but suppressed for the cooldown
    let mut cleared = 0;
    let mut frames = 0;
    while rig.locomotion.cooldown_remaining() > 0.0 {
        let output = rig.frame(&world, run_forward());
        frames += 1;
        if output.events.contains(&LocomotionEvent::WallJumpCooldownCleared) {
            cleared += 1;
        } else {
            assert!(!rig.locomotion.is_hanging());
            assert_eq!(output.mode, MovementMode::JumpingOffWallCooldown);
        }
        assert!(frames <= 60, "cooldown never cleared");
    }
    assert!((49..=51).contains(&frames), "cleared after {frames} frames");

    let output = rig.frame(&world, run_forward());
    assert_eq!(cleared, 1);
    assert!(rig.locomotion.is_hanging());
    assert!(!output.events.contains(&LocomotionEvent::WallJumpCooldownCleared));
}

#[test]
fn falling_out_of_the_world_respawns() {
    let spawn = Vec3::new(1.0, 2.0, 3.0);
    let world = AnalyticWorld::new();
    let mut rig = Rig::at(spawn);
    rig.body.position = Vec3::new(4.0, -220.0, 4.0);
    rig.body.velocity = Vec3::new(0.0, -50.0, 0.0);

    let output = rig.frame(&world, idle());
    assert_eq!(output.body.velocity, Some(Vec3::ZERO));
    assert_eq!(output.body.teleport, Some(spawn));
    assert_eq!(output.body.force, Vec3::ZERO);
    assert!(output.events.contains(&LocomotionEvent::Respawned));
    assert_eq!(rig.body.position, spawn);
    assert_eq!(rig.body.velocity, Vec3::ZERO);
}

#[test]
fn wall_at_side_pulls_hand_while_walking() {
    let world = AnalyticWorld::new()
        .with_ground(0.0)
        .with_box(Vec3::new(1.0, 0.0, -10.0), Vec3::new(2.0, 6.0, 10.0));
    let mut rig = Rig::at(Vec3::new(0.0, 0.05, 0.0));

    let mut previous = 0.0;
    for _ in 0..20 {
        rig.frame(&world, idle());
        let weight = rig.effectors.right_hand.position_weight;
        assert!(weight > previous && weight <= 0.5);
        previous = weight;
    }
    assert_eq!(rig.effectors.left_hand.position_weight, 0.0);
    assert!((rig.effectors.right_hand.position.x - 1.0).abs() < 1e-4);
}

#[test]
fn camera_backs_off_with_speed() {
    let world = AnalyticWorld::new().with_ground(0.0);
    let mut rig = Rig::at(Vec3::new(0.0, 0.05, 0.0));
    rig.body.velocity = Vec3::new(0.0, 0.0, -20.0);
    for _ in 0..100 {
        rig.frame(&world, idle());
    }
    let pose = rig.camera.step(
        &CameraFrame {
            target: Vec3::Y * 1.6,
            target_velocity: rig.body.velocity,
            dt: DT,
        },
        &rig.locomotion,
    );
    assert!(pose.distance > 3.9 && pose.distance <= 4.0 + 1e-4);
}
