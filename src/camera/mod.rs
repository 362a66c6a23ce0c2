//! Third-person follow camera.
//!
//! Runs in `PostUpdate` after rapier has written body transforms back, so
//! the camera tracks where the character actually ended up this frame.

pub mod config;
pub mod cutout;
pub mod orbit;

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;

pub use config::CameraConfig;
pub use cutout::{
    apply_cutout, cutout_coordinate, occlusion_probe, screen_ratio_divisor, CutoutParams, CutoutSink,
    MatrixProjection, ViewportProjection,
};
pub use orbit::{CameraFrame, CameraPose, FollowCamera};

use crate::engine::{CharacterSettings, FrameSet};
use crate::input::LookInput;
use crate::locomotion::LocomotionController;
use crate::physics::{occlusion_groups, RapierProbe};
use crate::sensing::RayHit;

pub struct FollowCameraPlugin;

impl Plugin for FollowCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LookInput>()
            .add_systems(Startup, lock_cursor)
            .add_systems(PostUpdate, orbit_camera.in_set(FrameSet::Camera))
            .add_systems(PostUpdate, update_cutouts.in_set(FrameSet::Cutout));
    }
}

/// Which character a camera follows.
#[derive(Component, Debug, Clone, Copy)]
pub struct FollowTarget {
    pub character: Entity,
    /// Orbit pivot relative to the character origin
    pub offset: Vec3,
}

/// Cutout state for a surface currently hiding the character.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CutoutOccluder(pub CutoutParams);

fn lock_cursor(settings: Res<CharacterSettings>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    if !settings.0.camera.lock_cursor {
        return;
    }
    for mut window in &mut windows {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

fn orbit_camera(
    time: Res<Time>,
    look: Res<LookInput>,
    mut cameras: Query<(&mut FollowCamera, &FollowTarget, &mut Transform), Without<LocomotionController>>,
    characters: Query<(&Transform, &Velocity, &LocomotionController)>,
) {
    for (mut camera, follow, mut transform) in &mut cameras {
        let Ok((character, velocity, locomotion)) = characters.get(follow.character) else {
            continue;
        };
        camera.look(look.delta);
        let frame = CameraFrame {
            target: character.translation + follow.offset,
            target_velocity: velocity.linvel,
            dt: time.delta_secs(),
        };
        let pose = camera.step(&frame, locomotion);
        transform.translation = pose.position;
        transform.rotation = pose.rotation;
    }
}

/// Collects occluding colliders for one camera.
#[derive(Default)]
struct OccluderSet(Vec<(Entity, CutoutParams)>);

impl CutoutSink for OccluderSet {
    fn set_cutout(&mut self, hit: &RayHit, params: &CutoutParams) {
        if let Some(entity) = hit.collider {
            self.0.push((entity, *params));
        }
    }
}

fn update_cutouts(
    mut commands: Commands,
    settings: Res<CharacterSettings>,
    rapier: ReadDefaultRapierContext,
    cameras: Query<(&Camera, &Transform, &FollowTarget)>,
    characters: Query<&Transform, With<LocomotionController>>,
    occluders: Query<(Entity, &CutoutOccluder)>,
) {
    let context = rapier.single();
    let mut found = OccluderSet::default();

    for (camera, transform, follow) in &cameras {
        let Ok(character) = characters.get(follow.character) else {
            continue;
        };
        let projection = MatrixProjection {
            clip_from_view: camera.clip_from_view(),
            world_from_view: transform.compute_matrix(),
            viewport_size: camera.physical_viewport_size().unwrap_or(UVec2::ONE),
        };
        let world = RapierProbe::new(context).with_groups(occlusion_groups());
        apply_cutout(
            &world,
            &projection,
            &mut found,
            transform.translation,
            character.translation + follow.offset,
            &settings.0.camera,
        );
    }

    for (entity, previous) in &occluders {
        match found.0.iter().position(|(hit, _)| *hit == entity) {
            None => {
                commands.entity(entity).remove::<CutoutOccluder>();
            }
            Some(index) if found.0[index].1 == previous.0 => {
                found.0.swap_remove(index);
            }
            Some(_) => {}
        }
    }
    for (entity, params) in found.0 {
        if let Some(mut target) = commands.get_entity(entity) {
            target.try_insert(CutoutOccluder(params));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occluder_set_skips_untagged_hits() {
        let mut set = OccluderSet::default();
        let params = CutoutParams::default();
        let hit = RayHit {
            point: Vec3::ZERO,
            normal: Vec3::Z,
            distance: 1.0,
            collider: None,
        };
        set.set_cutout(&hit, &params);
        assert!(set.0.is_empty());

        let tagged = RayHit {
            collider: Some(Entity::from_raw(3)),
            ..hit
        };
        set.set_cutout(&tagged, &params);
        assert_eq!(set.0.len(), 1);
    }

    #[test]
    fn test_default_camera_config_is_valid() {
        assert!(CameraConfig::default().validate().is_ok());
        assert!(CameraConfig {
            pitch_min: 10.0,
            pitch_max: 10.0,
            ..CameraConfig::default()
        }
        .validate()
        .is_err());
    }
}
