use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::camera::CameraConfig;
use crate::ik::IkConfig;
use crate::locomotion::LocomotionConfig;
use crate::math::BlendTiming;

/// Config file picked up at startup and watched for hot-reload.
pub const DEFAULT_CONFIG_PATH: &str = "config/character.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("failed to write RON: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format `{0}` (expected .ron or .json)")]
    UnsupportedFormat(String),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

pub(crate) fn ensure(condition: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

/// Every tunable of the character rig in one document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub locomotion: LocomotionConfig,
    pub ik: IkConfig,
    pub camera: CameraConfig,
    pub blend: BlendTiming,
}

impl CharacterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locomotion.validate()?;
        self.ik.validate()?;
        self.camera.validate()?;
        if let BlendTiming::FrameRateScaled { reference_hz } = self.blend {
            ensure(reference_hz > 0.0, "blend.reference_hz", "must be positive")?;
        }
        Ok(())
    }

    /// Parse and validate a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk, choosing the format by file extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron_str(&source),
            Some("json") => Self::from_json_str(&source),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
