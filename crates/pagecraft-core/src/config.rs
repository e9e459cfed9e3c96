//! Editor configuration.

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::document::DUPLICATE_OFFSET;
use crate::units::Unit;
use crate::viewport::{RULER_SIZE, ZoomConfig};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default debounce between the last change and an autosave.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

/// Errors related to loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },
}

/// Tunables for an [`Editor`](crate::editor::Editor). Missing keys in a
/// config file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo entries.
    pub history_capacity: usize,
    pub zoom: ZoomConfig,
    /// Ruler inset subtracted when centring the page.
    pub ruler_size: f64,
    /// Offset applied to duplicated components.
    pub duplicate_offset: f64,
    pub autosave_delay_ms: u64,
    /// Units shown on rulers; also picks the grid size.
    pub units: Unit,
    /// Snap gesture positions and sizes to the unit grid.
    pub snap_to_grid: bool,
    /// Snap moved components to the edges and centres of the others.
    pub snap_to_guides: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            zoom: ZoomConfig::default(),
            ruler_size: RULER_SIZE,
            duplicate_offset: DUPLICATE_OFFSET,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            units: Unit::default(),
            snap_to_grid: false,
            snap_to_guides: false,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "history_capacity".to_string(),
                value: self.history_capacity.to_string(),
            });
        }
        if !self.zoom.is_valid() {
            return Err(ConfigError::ValueOutOfRange {
                key: "zoom".to_string(),
                value: format!("{}..{}", self.zoom.min, self.zoom.max),
            });
        }
        if !self.ruler_size.is_finite() || self.ruler_size < 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "ruler_size".to_string(),
                value: self.ruler_size.to_string(),
            });
        }
        if !self.duplicate_offset.is_finite() {
            return Err(ConfigError::ValueOutOfRange {
                key: "duplicate_offset".to_string(),
                value: self.duplicate_offset.to_string(),
            });
        }
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Grid spacing for snapping, if enabled.
    pub fn grid_size(&self) -> Option<f64> {
        self.snap_to_grid.then(|| self.units.grid_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_capacity, 50);
        assert!((config.zoom.sensitivity - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.autosave_delay(), Duration::from_secs(2));
        assert_eq!(config.grid_size(), None);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(
            r#"{ "history_capacity": 10, "units": "px", "snap_to_grid": true, "zoom": { "max": 8.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.history_capacity, 10);
        assert!((config.zoom.max - 8.0).abs() < f64::EPSILON);
        assert!((config.zoom.min - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.grid_size(), Some(10.0));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            EditorConfig::from_json(r#"{ "zoom": { "min": 3.0, "max": 1.0 } }"#),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{ "ruler_size": -4 }"#),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{ "history_capacity": 0 }"#),
            Err(ConfigError::ValueOutOfRange { key, .. }) if key == "history_capacity"
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{ "zoom": { "step": -0.1 } }"#),
            Err(ConfigError::ValueOutOfRange { key, .. }) if key == "zoom"
        ));
        assert!(matches!(EditorConfig::from_json("[1, 2"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "duplicate_offset": 8 }}"#).unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert!((config.duplicate_offset - 8.0).abs() < f64::EPSILON);

        assert!(matches!(
            EditorConfig::load(file.path().with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
