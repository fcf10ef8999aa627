//! Editor tunables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Thresholds and sizes used by the store and the interaction machine.
///
/// Values suffixed `_px` are screen pixels and are divided by the current
/// zoom before being compared against world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_node_size: f64,
    pub snap_threshold_px: f64,
    pub handle_size_px: f64,
    pub rotate_handle_offset_px: f64,
    /// Movement below this many world units is a click, not a drag.
    pub click_threshold: f64,
    pub double_click_ms: u64,
    pub double_click_distance: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Angular tolerance for the 90° rotation magnet, in degrees.
    pub rotation_magnet_deg: f64,
    pub duplicate_offset: f64,
    pub max_undo_history: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_node_size: crate::node::MIN_NODE_SIZE,
            snap_threshold_px: 8.0,
            handle_size_px: 10.0,
            rotate_handle_offset_px: 24.0,
            click_threshold: 5.0,
            double_click_ms: 500,
            double_click_distance: 5.0,
            min_zoom: crate::viewport::MIN_ZOOM,
            max_zoom: crate::viewport::MAX_ZOOM,
            rotation_magnet_deg: 5.0,
            duplicate_offset: 20.0,
            max_undo_history: 50,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_node_size <= 0.0 {
            return Err(ConfigError::Invalid("min_node_size must be positive".into()));
        }
        if self.min_zoom <= 0.0 || self.min_zoom >= self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.handle_size_px <= 0.0 || self.snap_threshold_px < 0.0 || self.click_threshold < 0.0 {
            return Err(ConfigError::Invalid("sizes and thresholds must not be negative".into()));
        }
        Ok(())
    }

    pub fn rotation_magnet(&self) -> f64 {
        self.rotation_magnet_deg.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.min_node_size - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "snap_threshold_px": 6 }"#).unwrap();
        assert!((config.snap_threshold_px - 6.0).abs() < f64::EPSILON);
        assert_eq!(config.max_undo_history, 50);
    }

    #[test]
    fn test_rejects_empty_zoom_range() {
        let err = EditorConfig::from_json(r#"{ "min_zoom": 2, "max_zoom": 1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
