//! Editor tuning knobs.
//!
//! # Responsibility
//! - Collect the timing and geometry constants used across the core.
//! - Accept host overrides as JSON where every field is optional.
//!
//! # Invariants
//! - `validate()` must pass before a config reaches the controller.
//! - `zoom_min <= 1.0 <= zoom_max` so reset always lands inside the bounds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Rejected configuration values.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON could not be parsed into a config.
    Parse(serde_json::Error),
    /// A field is outside its accepted range.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid editor config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Pan/zoom limits and step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Increment applied by the discrete zoom controls.
    pub zoom_step: f64,
    /// Zoom change per unit of wheel delta while zooming.
    pub wheel_zoom_sensitivity: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.2,
            zoom_max: 3.0,
            zoom_step: 0.1,
            wheel_zoom_sensitivity: 0.001,
        }
    }
}

/// Serpentine map geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Cells per row.
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    /// How far a row-change curve bulges past the row end.
    pub turn_bulge: f64,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            spacing_x: 240.0,
            spacing_y: 200.0,
            margin_x: 120.0,
            margin_y: 100.0,
            turn_bulge: 120.0,
        }
    }
}

/// Block footprint defaults and resize limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSizing {
    pub default_width: f64,
    pub default_height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for BlockSizing {
    fn default() -> Self {
        Self {
            default_width: 320.0,
            default_height: 180.0,
            min_width: 200.0,
            min_height: 100.0,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last edit before an automatic save.
    pub save_debounce_ms: u64,
    /// Window in which a second delete request confirms the first.
    pub delete_confirm_ms: u64,
    pub viewport: ViewportConfig,
    pub snake: SnakeConfig,
    pub block: BlockSizing,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 1000,
            delete_confirm_ms: 3000,
            viewport: ViewportConfig::default(),
            snake: SnakeConfig::default(),
            block: BlockSizing::default(),
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON override; missing fields keep defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn delete_confirm_window(&self) -> Duration {
        Duration::from_millis(self.delete_confirm_ms)
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let viewport = &self.viewport;
        if !(viewport.zoom_min > 0.0) {
            return Err(invalid("viewport.zoom_min", "must be positive"));
        }
        if !(viewport.zoom_min <= 1.0 && 1.0 <= viewport.zoom_max) {
            return Err(invalid("viewport.zoom_max", "zoom bounds must include 1.0"));
        }
        if !(viewport.zoom_step > 0.0) {
            return Err(invalid("viewport.zoom_step", "must be positive"));
        }
        if !(viewport.wheel_zoom_sensitivity > 0.0) {
            return Err(invalid("viewport.wheel_zoom_sensitivity", "must be positive"));
        }
        if self.snake.columns == 0 {
            return Err(invalid("snake.columns", "must be at least 1"));
        }
        if self.block.min_width > self.block.default_width
            || self.block.min_height > self.block.default_height
        {
            return Err(invalid("block", "minimum size exceeds default size"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EditorConfig};
    use std::time::Duration;

    #[test]
    fn defaults_validate() {
        let config = EditorConfig::default();
        config.validate().expect("defaults must be valid");
        assert_eq!(config.delete_confirm_window(), Duration::from_secs(3));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            EditorConfig::from_json(r#"{"save_debounce_ms":250,"snake":{"columns":3}}"#).unwrap();
        assert_eq!(config.save_debounce(), Duration::from_millis(250));
        assert_eq!(config.snake.columns, 3);
        assert_eq!(config.snake.spacing_x, 240.0);
        assert_eq!(config.viewport, EditorConfig::default().viewport);
    }

    #[test]
    fn rejects_bounds_that_exclude_identity_zoom() {
        let err = EditorConfig::from_json(r#"{"viewport":{"zoom_min":1.5}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "viewport.zoom_max",
                ..
            }
        ));
        assert!(matches!(
            EditorConfig::from_json("{").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
