//! Structured logging via `tracing`.
//!
//! - Level filtering per module, overridable with `RUST_LOG`
//! - Idempotent initialization, safe from the C ABI and from Bevy alike

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber unless something else already did.
///
/// Apps that keep Bevy's `LogPlugin` get its subscriber and this is a no-op.
pub struct LoggingPlugin;

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing_default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_targets: bool,
    pub show_thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("character_core::locomotion".to_string(), LogLevel::Info),
                ("character_core::ik".to_string(), LogLevel::Info),
                ("character_core::hotreload".to_string(), LogLevel::Info),
                ("character_core::bridge".to_string(), LogLevel::Warn),
                ("wgpu".to_string(), LogLevel::Error),
            ],
            show_targets: true,
            show_thread_ids: false,
        }
    }
}

impl TracingConfig {
    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{}={}", module, level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();

pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// First call wins; later calls and an already-installed global subscriber are ignored.
pub fn init_tracing(config: &TracingConfig) {
    let filter_str = config.to_env_filter_string();
    let show_targets = config.show_targets;
    let show_thread_ids = config.show_thread_ids;
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(show_targets)
            .with_thread_ids(show_thread_ids)
            .compact();

        let _ = subscriber.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_string() {
        let filter = TracingConfig::default().to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("character_core::bridge=warn"));
        assert!(filter.contains("character_core::locomotion=info"));
    }

    #[test]
    fn test_custom_filter() {
        let config = TracingConfig {
            default_level: LogLevel::Debug,
            module_filters: vec![("character_core::camera".to_string(), LogLevel::Trace)],
            show_targets: false,
            show_thread_ids: true,
        };
        assert_eq!(config.to_env_filter_string(), "debug,character_core::camera=trace");
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing_default();
        init_tracing_default();
        init_tracing(&TracingConfig::default());
        tracing::info!(target: "character_core", "tracing initialised");
    }
}
