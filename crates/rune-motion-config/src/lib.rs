//! Rune Motion configuration system
//!
//! Loads animation and playback settings from `rune-motion.toml`, with
//! `MOTION_*` environment variables taking precedence over file values.
//!
//! ```toml
//! [animation]
//! duration = 800
//! stagger = 50
//! mode = "draw"
//! loop = true
//!
//! [animation.elements.logo]
//! mode = "scale"
//! delay = 200
//!
//! [playback]
//! frame_ms = 16
//! target = "#logo"
//! ```

use std::path::{Path, PathBuf};

use rune_motion_core::{AnimatorConfig, EasingFunction, MotionKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "rune-motion.toml";

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure for Rune Motion
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Animator settings, handed to every controller as-is
    pub animation: AnimatorConfig,
    /// Demo playback settings
    pub playback: PlaybackConfig,
}

/// Playback driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Timeline step per frame in milliseconds
    pub frame_ms: f64,
    /// Stop after this many frames even when looping
    pub max_frames: u32,
    /// CSS selector of the element tree to animate; the root `<svg>` when unset
    pub target: Option<String>,
    /// SVG file to load
    pub input: Option<PathBuf>,
    /// Print notifications as JSON lines instead of log records
    pub json_events: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16.0,
            max_frames: 10_000,
            target: None,
            input: None,
            json_events: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl MotionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `path`, or return the defaults if it is missing
    /// or unreadable
    pub fn load_from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Io { path, source })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(%err, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load configuration from the default location (rune-motion.toml in the
    /// current directory) or return default configuration if it doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file_or_default(DEFAULT_CONFIG_FILE)
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|name| std::env::var(name).ok());
    }

    /// Merge overrides looked up by variable name.
    ///
    /// Values that fail to parse are logged and skipped.
    pub fn merge_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Animation settings
        if let Some(val) = lookup("MOTION_DURATION") {
            match val.parse::<f64>() {
                Ok(duration) => self.animation.duration = duration,
                Err(_) => tracing::warn!(value = %val, "ignoring MOTION_DURATION"),
            }
        }
        if let Some(val) = lookup("MOTION_DELAY") {
            match val.parse::<f64>() {
                Ok(delay) => self.animation.delay = delay,
                Err(_) => tracing::warn!(value = %val, "ignoring MOTION_DELAY"),
            }
        }
        if let Some(val) = lookup("MOTION_STAGGER") {
            match val.parse::<f64>() {
                Ok(stagger) => self.animation.stagger = stagger,
                Err(_) => tracing::warn!(value = %val, "ignoring MOTION_STAGGER"),
            }
        }
        if let Some(val) = lookup("MOTION_MODE") {
            match MotionKind::from_name(&val) {
                Some(mode) => self.animation.mode = mode,
                None => tracing::warn!(value = %val, "ignoring MOTION_MODE"),
            }
        }
        if let Some(val) = lookup("MOTION_EASING") {
            match val.parse::<EasingFunction>() {
                Ok(easing) => self.animation.easing = easing,
                Err(err) => tracing::warn!(%err, "ignoring MOTION_EASING"),
            }
        }
        if let Some(val) = lookup("MOTION_LOOP") {
            self.animation.looping = parse_flag(&val);
        }
        if let Some(val) = lookup("MOTION_AUTOPLAY") {
            self.animation.auto_play = parse_flag(&val);
        }

        // Playback settings
        if let Some(val) = lookup("MOTION_FRAME_MS") {
            match val.parse::<f64>() {
                Ok(frame_ms) if frame_ms > 0.0 => self.playback.frame_ms = frame_ms,
                _ => tracing::warn!(value = %val, "ignoring MOTION_FRAME_MS"),
            }
        }
        if let Some(target) = lookup("MOTION_TARGET") {
            self.playback.target = Some(target);
        }
        if let Some(val) = lookup("MOTION_JSON") {
            self.playback.json_events = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune-motion.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
