// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Settings are stored as RON. Missing fields take their defaults so partial
//! files stay valid as new settings are added.

use crate::history::MAX_HISTORY;
use crate::scale::DEFAULT_VISIBLE_DURATION_MS;
use crate::snap::SnapSettings;
use crate::ticks::DEFAULT_TICK_SPACING_PX;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current settings format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default clip edge handle width in pixels
pub const DEFAULT_EDGE_HANDLE_PX: f64 = 8.0;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest readable version
        supported: u32,
    },

    /// A value is out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// How overlapping clips of the same kind are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Overlaps are stored as-is
    #[default]
    Allow,
    /// Programmatic edits fail and drags are reverted
    Reject,
}

/// Keyboard navigation amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    /// Arrow key step
    pub nudge_ms: i64,
    /// Arrow key step with Shift held
    pub nudge_shift_ms: i64,
    /// End key target when the project duration is unknown
    pub end_fallback_ms: i64,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            nudge_ms: 1_000,
            nudge_shift_ms: 5_000,
            end_fallback_ms: 600_000,
        }
    }
}

/// Complete editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Settings format version
    pub version: u32,
    /// Snapping
    pub snap: SnapSettings,
    /// Minimum pixel distance between ruler ticks
    pub tick_spacing_px: f64,
    /// Width of the resize handle at each clip edge
    pub edge_handle_px: f64,
    /// Keyboard navigation
    pub keyboard: KeyboardSettings,
    /// Overlap handling
    pub overlap_policy: OverlapPolicy,
    /// Maximum undo depth
    pub history_depth: usize,
    /// Visible duration of a freshly opened document
    pub default_visible_duration_ms: i64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            snap: SnapSettings::default(),
            tick_spacing_px: DEFAULT_TICK_SPACING_PX,
            edge_handle_px: DEFAULT_EDGE_HANDLE_PX,
            keyboard: KeyboardSettings::default(),
            overlap_policy: OverlapPolicy::default(),
            history_depth: MAX_HISTORY,
            default_visible_duration_ms: DEFAULT_VISIBLE_DURATION_MS,
        }
    }
}

impl EditorConfig {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Encode settings as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded editor settings from {:?}", path);
        Ok(config)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved editor settings to {:?}", path);
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;

        if !self.snap.threshold_px.is_finite() || self.snap.threshold_px < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "snap threshold must be >= 0, got {}",
                self.snap.threshold_px
            )));
        }
        if !positive(self.tick_spacing_px) {
            return Err(ConfigError::Invalid(format!(
                "tick spacing must be > 0, got {}",
                self.tick_spacing_px
            )));
        }
        if !positive(self.edge_handle_px) {
            return Err(ConfigError::Invalid(format!(
                "edge handle width must be > 0, got {}",
                self.edge_handle_px
            )));
        }
        let keyboard = &self.keyboard;
        if keyboard.nudge_ms <= 0 || keyboard.nudge_shift_ms <= 0 || keyboard.end_fallback_ms < 0 {
            return Err(ConfigError::Invalid(format!("keyboard steps out of range: {:?}", keyboard)));
        }
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid("history depth must be at least 1".to_string()));
        }
        if self.default_visible_duration_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "visible duration must be > 0, got {}",
                self.default_visible_duration_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.keyboard.nudge_ms, 1_000);
        assert_eq!(config.keyboard.nudge_shift_ms, 5_000);
        assert_eq!(config.keyboard.end_fallback_ms, 600_000);
        assert_eq!(config.snap.threshold_px, 8.0);
        assert_eq!(config.overlap_policy, OverlapPolicy::Allow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let mut config = EditorConfig::default();
        config.overlap_policy = OverlapPolicy::Reject;
        config.keyboard.nudge_ms = 250;
        let text = config.to_ron().unwrap();
        let loaded = EditorConfig::from_ron(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = EditorConfig::from_ron("(overlap_policy: reject, tick_spacing_px: 120.0)").unwrap();
        assert_eq!(loaded.overlap_policy, OverlapPolicy::Reject);
        assert_eq!(loaded.tick_spacing_px, 120.0);
        assert_eq!(loaded.history_depth, MAX_HISTORY);
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = EditorConfig::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { found: 99, .. }));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = EditorConfig::from_ron("(history_depth: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = EditorConfig::from_ron("(tick_spacing_px: -1.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(EditorConfig::from_ron("(version: "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("castline-config-{}.ron", uuid::Uuid::new_v4()));
        let config = EditorConfig::default();
        config.save(&path).unwrap();
        let loaded = EditorConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
