//! Engine integration layer.
//!
//! Owns what every character plugin shares: the frame ordering
//! ([`FrameSet`]), the live [`CharacterSettings`] resource and the
//! [`CharacterConfig`] document they are built from.
//!
//! Ordering within a frame:
//!   Update:      Input -> Locomotion -> Ik
//!   PostUpdate:  (rapier writeback) -> Camera -> Cutout -> transform propagation

pub mod config;
pub mod plugin;

pub use config::{CharacterConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use plugin::{load_startup_config, CharacterSettings, EnginePlugin, FrameSet};
