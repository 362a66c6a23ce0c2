//! Character Core - third-person character behaviour
//!
//! Decision logic for a physics-driven humanoid and the Bevy plugins that
//! run it on bevy_rapier3d bodies:
//! - Locomotion: walk/run/jump, slope handling, wall-hang and wall-jump
//! - Limb and gaze IK targets (wall touch, reaching while hanging)
//! - Follow camera with speed-based distance and occluder cutout
//! - Hot-reloadable RON/JSON configuration
//! - C-ABI JSON bridge for hosts with their own physics and animation

pub mod bridge;
pub mod camera;
pub mod constants;
pub mod engine;
pub mod hotreload;
pub mod ik;
pub mod input;
pub mod locomotion;
pub mod logging;
pub mod math;
pub mod physics;
pub mod sensing;
pub mod spin;

use bevy::prelude::*;

/// Every character plugin in dependency order. Physics is left to the app.
pub struct CharacterPlugins;

impl Plugin for CharacterPlugins {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            engine::EnginePlugin,
            logging::LoggingPlugin,
            input::InputPlugin,
            locomotion::LocomotionPlugin,
            ik::IkPlugin,
            camera::FollowCameraPlugin,
            spin::SpinPlugin,
            hotreload::HotReloadPlugin,
        ));
    }
}
