//! Limb and gaze targets layered over locomotion.
//!
//! While hanging, one hand reaches for where the camera looks and the head
//! and body follow it. Otherwise hands brace against walls to either side.
//!
//! `direct_ik` runs every rendered frame in `Update`. The blend rates are
//! tuned for a 50 Hz fixed step; `BlendTiming::FrameRateScaled` with its
//! 50 Hz reference keeps the per-second fade the same at any frame rate.

pub mod config;
pub mod director;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub use config::IkConfig;
pub use director::{ArmProbes, ArmSensors, GazeTarget, HandEffector, IkDirector, IkFrame, IkRig, Side};

use crate::engine::FrameSet;
use crate::locomotion::{BodySnapshot, CharacterLinks, LocomotionController};
use crate::physics::RapierProbe;

pub struct IkPlugin;

impl Plugin for IkPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, direct_ik.in_set(FrameSet::Ik));
    }
}

/// Hand bones of the rig, used as the idle targets while reaching.
#[derive(Component, Debug, Clone, Copy)]
pub struct IkBones {
    pub left_hand: Entity,
    pub right_hand: Entity,
}

fn direct_ik(
    time: Res<Time>,
    rapier: ReadDefaultRapierContext,
    transforms: Query<&GlobalTransform>,
    mut rigs: Query<(
        Entity,
        &mut IkDirector,
        &mut IkRig,
        &LocomotionController,
        &Transform,
        Option<&IkBones>,
        Option<&CharacterLinks>,
    )>,
) {
    let context = rapier.single();
    let dt = time.delta_secs();

    for (entity, mut director, mut rig, locomotion, transform, bones, links) in &mut rigs {
        let body = BodySnapshot {
            position: transform.translation,
            rotation: transform.rotation,
            velocity: Vec3::ZERO,
        };
        let camera = links.and_then(|links| transforms.get(links.camera).ok());
        let (camera_position, camera_forward) = match camera {
            Some(camera) => (camera.translation(), *camera.forward()),
            None => (body.position - body.forward(), body.forward()),
        };
        let bone = |bone: Option<Entity>| {
            bone.and_then(|bone| transforms.get(bone).ok())
                .map(GlobalTransform::translation)
                .unwrap_or(body.position)
        };

        let frame = IkFrame {
            body,
            camera_position,
            camera_forward,
            left_bone: bone(bones.map(|b| b.left_hand)),
            right_bone: bone(bones.map(|b| b.right_hand)),
            dt,
        };
        let world = RapierProbe::excluding(context, entity);
        director.update(&mut rig, &world, &frame, locomotion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CharacterConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IkConfig::default().validate().is_ok());
        assert!(CharacterConfig::default().ik.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        let config = IkConfig {
            wall_touch_rate: 1.5,
            ..IkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_rate_does_not_change_wall_touch_fade() {
        use crate::locomotion::ObservedLocomotion;
        use crate::math::BlendTiming;
        use crate::sensing::RayHit;

        let view = ObservedLocomotion {
            hanging: false,
            grounded: true,
            max_speed: 20.0,
            wall_hit: None,
        };
        let sensors = ArmSensors {
            left: None,
            right: Some(RayHit {
                point: Vec3::new(1.0, 2.0, 0.0),
                normal: Vec3::NEG_X,
                distance: 1.0,
                collider: None,
            }),
        };
        let frame = |dt: f32| IkFrame {
            body: BodySnapshot::at_rest(Vec3::ZERO),
            camera_position: Vec3::new(0.0, 1.6, 2.0),
            camera_forward: Vec3::NEG_Z,
            left_bone: Vec3::ZERO,
            right_bone: Vec3::ZERO,
            dt,
        };

        // One fixed 50 Hz step
        let mut fixed = IkDirector::new(IkConfig::default()).with_blend(BlendTiming::FixedStep);
        let mut fixed_rig = IkRig::default();
        fixed.step(&mut fixed_rig, &frame(0.02), &sensors, &view);

        // Two rendered frames at 100 Hz with the default timing
        let mut rendered = IkDirector::new(IkConfig::default());
        let mut rendered_rig = IkRig::default();
        for _ in 0..2 {
            rendered.step(&mut rendered_rig, &frame(0.01), &sensors, &view);
        }

        let expected = fixed_rig.right_hand.position_weight;
        assert!(expected > 0.0);
        assert!((rendered_rig.right_hand.position_weight - expected).abs() < 1e-5);
    }

    #[test]
    fn test_rig_hand_lookup() {
        let mut rig = IkRig::default();
        rig.left_hand.position_weight = 0.3;
        assert_eq!(rig.hand(Side::Left).position_weight, 0.3);
        assert_eq!(rig.hand(Side::Right).position_weight, 0.0);
    }
}
