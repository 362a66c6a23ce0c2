use bevy::prelude::*;
use bevy::transform::TransformSystem;
use bevy_rapier3d::plugin::PhysicsSet;
use std::path::Path;

use crate::engine::config::{CharacterConfig, DEFAULT_CONFIG_PATH};

/// Frame ordering shared by every character plugin.
///
/// Locomotion is the state authority: IK and camera read it within the same
/// frame, so they are ordered strictly after it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Locomotion,
    Ik,
    Camera,
    Cutout,
}

/// Live character configuration. Hot-reload replaces it in place.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CharacterSettings(pub CharacterConfig);

pub struct EnginePlugin;

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        let config = load_startup_config(Path::new(DEFAULT_CONFIG_PATH));

        app.insert_resource(CharacterSettings(config))
            .configure_sets(
                Update,
                (FrameSet::Input, FrameSet::Locomotion, FrameSet::Ik).chain(),
            )
            .configure_sets(
                PostUpdate,
                (FrameSet::Camera, FrameSet::Cutout)
                    .chain()
                    .after(PhysicsSet::Writeback)
                    .before(TransformSystem::TransformPropagate),
            );
    }
}

/// Config from disk when present and valid, defaults otherwise.
pub fn load_startup_config(path: &Path) -> CharacterConfig {
    if !path.exists() {
        info!("No character config at {:?}, using defaults", path);
        return CharacterConfig::default();
    }
    match CharacterConfig::load(path) {
        Ok(config) => {
            info!("Loaded character config from {:?}", path);
            config
        }
        Err(e) => {
            error!("Ignoring character config {:?}: {}", path, e);
            CharacterConfig::default()
        }
    }
}
