//! Configuration file support for the tile reviewer.
//!
//! Settings are stored as JSON. A missing or unreadable file falls back to
//! defaults; command-line flags override individual values afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_IMAGE_EXTENSION, DEFAULT_PREVIEW_SIZE, DEFAULT_SLIDER_X_MAX,
    DEFAULT_SLIDER_Y_MAX, DEFAULT_TILE_SIZE,
};
use crate::table::InitialLabel;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Range and step of the grid position sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderConfig {
    /// Largest horizontal position
    pub x_max: u32,
    /// Largest vertical position
    pub y_max: u32,
    /// Step between positions; follows `tile_size` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            x_max: DEFAULT_SLIDER_X_MAX,
            y_max: DEFAULT_SLIDER_Y_MAX,
            step: None,
        }
    }
}

fn snap(value: u32, step: u32, max: u32) -> u32 {
    let clamped = value.min(max);
    if step == 0 {
        return clamped;
    }
    let snapped = clamped.saturating_add(step / 2) / step * step;
    if snapped > max { snapped - step } else { snapped }
}

/// Automatic export of the corrected table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoExportConfig {
    /// Whether auto-export runs at all
    #[serde(default)]
    pub enabled: bool,

    /// Destination file; auto-export stays idle without one
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Seconds to wait after the last label change
    #[serde(default = "default_export_debounce_secs")]
    pub debounce_secs: u64,

    /// Minimum seconds between two exports
    #[serde(default = "default_export_interval_secs")]
    pub interval_secs: u64,
}

fn default_export_debounce_secs() -> u64 {
    5
}

fn default_export_interval_secs() -> u64 {
    30
}

impl Default for AutoExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            debounce_secs: default_export_debounce_secs(),
            interval_secs: default_export_interval_secs(),
        }
    }
}

/// Reviewer configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Wait before slider-driven lookups run (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Grid tile edge length in source pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Edge length of the rendered preview
    #[serde(default = "default_preview_size")]
    pub preview_size: u32,

    /// Grid slider bounds
    #[serde(default)]
    pub slider: SliderConfig,

    /// Extension of the image files (without the dot)
    #[serde(default = "default_image_extension")]
    pub image_extension: String,

    /// Column that seeds `label_new` when the table lacks it
    #[serde(default)]
    pub initial_label: InitialLabel,

    /// Automatic export settings
    #[serde(default)]
    pub auto_export: AutoExportConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_preview_size() -> u32 {
    DEFAULT_PREVIEW_SIZE
}

fn default_image_extension() -> String {
    DEFAULT_IMAGE_EXTENSION.to_string()
}

impl ReviewConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            debounce_ms: default_debounce_ms(),
            tile_size: default_tile_size(),
            preview_size: default_preview_size(),
            slider: SliderConfig::default(),
            image_extension: default_image_extension(),
            initial_label: InitialLabel::default(),
            auto_export: AutoExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Slider step in effect.
    pub fn slider_step(&self) -> u32 {
        self.slider.step.unwrap_or(self.tile_size)
    }

    /// Snap a raw horizontal value onto the slider grid.
    pub fn snap_x(&self, value: u32) -> u32 {
        snap(value, self.slider_step(), self.slider.x_max)
    }

    /// Snap a raw vertical value onto the slider grid.
    pub fn snap_y(&self, value: u32) -> u32 {
        snap(value, self.slider_step(), self.slider.y_max)
    }

    /// Debounce wait as a duration.
    pub fn debounce_wait(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "tile-review-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("tile-review").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("tile-review")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_review_layout() {
        let config = ReviewConfig::default();
        assert_eq!(config.debounce_wait(), Duration::from_millis(300));
        assert_eq!(config.tile_size, 200);
        assert_eq!(config.preview_size, 400);
        assert_eq!(config.slider.step, None);
        assert_eq!(config.slider_step(), 200);
        assert_eq!(config.image_extension, "jpg");
        assert!(!config.auto_export.enabled);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = ReviewConfig::default();
        config.debounce_ms = 150;
        config.initial_label = InitialLabel::Preds;
        config.auto_export.path = Some(PathBuf::from("corrected.csv"));

        let json = config.to_json().unwrap();
        assert_eq!(ReviewConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ReviewConfig::from_json(r#"{"version": 1, "tile_size": 100}"#).unwrap();
        assert_eq!(config.tile_size, 100);
        assert_eq!(config.slider_step(), 100);
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_version_too_new() {
        let err = ReviewConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ReviewConfig::default();
        config.save_to_path(&path).unwrap();
        assert_eq!(ReviewConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_slider_snap() {
        let config = ReviewConfig::default();
        assert_eq!(config.snap_x(0), 0);
        assert_eq!(config.snap_x(99), 0);
        assert_eq!(config.snap_x(100), 200);
        assert_eq!(config.snap_x(390), 400);
        assert_eq!(config.snap_x(9000), 4000);
        assert_eq!(config.snap_y(2100), 2000);
    }

    #[test]
    fn test_slider_step_follows_tile_size() {
        let config = ReviewConfig::from_json(r#"{"version": 1, "tile_size": 100}"#).unwrap();
        assert_eq!(config.snap_x(100), 100);
        assert_eq!(config.snap_x(260), 300);
        assert_eq!(config.snap_y(140), 100);

        let config = ReviewConfig::from_json(
            r#"{"version": 1, "tile_size": 100, "slider": {"x_max": 1000, "y_max": 1000, "step": 250}}"#,
        )
        .unwrap();
        assert_eq!(config.slider_step(), 250);
        assert_eq!(config.snap_x(300), 250);
        assert_eq!(config.snap_x(5000), 1000);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    }
}
