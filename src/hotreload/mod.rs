//! Live reload of `config/character.ron`.
//!
//! - `notify` watches the config directory
//! - A changed file is parsed and validated before anything is touched
//! - A bad edit leaves the running config in place and is reported
//! - Accepted configs flow into every controller, director and camera

use anyhow::Context;
use bevy::prelude::*;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use crate::camera::FollowCamera;
use crate::engine::{CharacterConfig, CharacterSettings, DEFAULT_CONFIG_PATH};
use crate::ik::IkDirector;
use crate::locomotion::LocomotionController;

pub struct HotReloadPlugin;

impl Plugin for HotReloadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HotReloadState>()
            .add_event::<ConfigReloadEvent>()
            .add_systems(Startup, setup_config_watcher)
            .add_systems(PreUpdate, (process_config_changes, apply_settings).chain());
    }
}

#[derive(Resource, Debug, Default)]
pub struct HotReloadState {
    pub enabled: bool,
    pub watched_file: Option<PathBuf>,
    pub reload_count: u32,
    pub last_error: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct ConfigReloadEvent {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl ConfigReloadEvent {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Resource)]
struct WatcherResource {
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
}

fn setup_config_watcher(mut commands: Commands, mut state: ResMut<HotReloadState>) {
    let config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    match watch(&config_path) {
        Ok(resource) => {
            state.enabled = true;
            state.watched_file = Some(config_path.clone());
            commands.insert_resource(resource);
            info!("Hot-reload enabled for {:?}", config_path);
        }
        Err(e) => {
            state.enabled = false;
            warn!("Hot-reload disabled: {:#}", e);
        }
    }
}

fn watch(config_path: &Path) -> anyhow::Result<WatcherResource> {
    if !config_path.exists() {
        anyhow::bail!("{} not found", config_path.display());
    }
    let directory = config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx).context("failed to create file watcher")?;
    watcher
        .watch(directory, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", directory.display()))?;

    Ok(WatcherResource {
        _watcher: watcher,
        receiver: Mutex::new(rx),
    })
}

fn process_config_changes(
    watcher: Option<Res<WatcherResource>>,
    mut state: ResMut<HotReloadState>,
    mut settings: ResMut<CharacterSettings>,
    mut events: EventWriter<ConfigReloadEvent>,
) {
    let Some(watcher) = watcher else {
        return;
    };
    let Some(path) = state.watched_file.clone() else {
        return;
    };

    let mut modified = false;
    if let Ok(receiver) = watcher.receiver.lock() {
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(event) => modified |= is_config_modify_event(&event, &path),
                Err(e) => warn!("File watcher error: {}", e),
            }
        }
    }
    if !modified {
        return;
    }

    // Editors often write in several steps; one reload per frame is enough
    match reload_config(&path) {
        Ok(config) => {
            state.reload_count += 1;
            state.last_error = None;
            if config != settings.0 {
                settings.0 = config;
            }
            info!(reloads = state.reload_count, "Character config reloaded");
            events.send(ConfigReloadEvent { path, error: None });
        }
        Err(e) => {
            let message = format!("{:#}", e);
            error!("Config reload failed, keeping previous settings: {}", message);
            state.last_error = Some(message.clone());
            events.send(ConfigReloadEvent {
                path,
                error: Some(message),
            });
        }
    }
}

/// Push the live settings into every component that holds a copy.
fn apply_settings(
    settings: Res<CharacterSettings>,
    mut controllers: Query<&mut LocomotionController>,
    mut directors: Query<&mut IkDirector>,
    mut cameras: Query<&mut FollowCamera>,
) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    let config = settings.0;
    for mut controller in &mut controllers {
        controller.reconfigure(config.locomotion, config.blend);
    }
    for mut director in &mut directors {
        director.reconfigure(config.ik, config.blend);
    }
    for mut camera in &mut cameras {
        camera.reconfigure(config.camera, config.blend);
    }
}

fn is_config_modify_event(event: &Event, watched_file: &Path) -> bool {
    let Some(name) = watched_file.file_name() else {
        return false;
    };
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(name))
}

/// Read, parse and validate the config at `path`.
pub fn reload_config(path: &Path) -> anyhow::Result<CharacterConfig> {
    CharacterConfig::load(path).with_context(|| format!("reloading {}", path.display()))
}
