//! Style and timing knobs for the reveal animation.
//!
//! Every field is optional in JSON; missing fields take the defaults
//! below. Loading validates positivity, nothing else.
//!
//! ```json
//! {
//!   "text_color": { "r": 1.0, "g": 0.0, "b": 0.0 },
//!   "font_size_sp": 18.0,
//!   "sweep_distance": 36.0,
//!   "tick_interval_ms": 18
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paint::{Color, DEFAULT_FONT_SIZE_SP};

/// Pixels the sweep edge moves per tick.
pub const DEFAULT_SWEEP_DISTANCE: f32 = 36.0;
/// Delay between ticks, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 18;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    pub text_color: Color,
    /// Font size in scale-independent units.
    pub font_size_sp: f32,
    /// Sweep advance per tick in pixels.
    pub sweep_distance: f32,
    pub tick_interval_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            text_color: Color::RED,
            font_size_sp: DEFAULT_FONT_SIZE_SP,
            sweep_distance: DEFAULT_SWEEP_DISTANCE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl RevealConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        debug!("Loaded reveal config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Reject non-positive sizes and intervals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("font_size_sp", self.font_size_sp as f64),
            ("sweep_distance", self.sweep_distance as f64),
            ("tick_interval_ms", self.tick_interval_ms as f64),
        ];
        for (field, value) in checks {
            // NaN fails this comparison too.
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RevealConfig::default();
        assert_eq!(config.text_color, Color::RED);
        assert_eq!(config.font_size_sp, 18.0);
        assert_eq!(config.sweep_distance, 36.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(18));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RevealConfig::from_json(r#"{ "sweep_distance": 12.0 }"#).unwrap();
        assert_eq!(config.sweep_distance, 12.0);
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(config.font_size_sp, DEFAULT_FONT_SIZE_SP);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(RevealConfig::from_json("{}").unwrap(), RevealConfig::default());
    }

    #[test]
    fn test_color_from_json() {
        let config = RevealConfig::from_json(
            r#"{ "text_color": { "r": 0.0, "g": 0.5, "b": 1.0, "a": 0.25 } }"#,
        )
        .unwrap();
        assert_eq!(config.text_color, Color::rgba(0.0, 0.5, 1.0, 0.25));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = RevealConfig::from_json(r#"{ "tick_interval_ms": 0 }"#).unwrap_err();
        match err {
            ConfigError::NonPositive { field, .. } => assert_eq!(field, "tick_interval_ms"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_negative_sweep() {
        let err = RevealConfig::from_json(r#"{ "sweep_distance": -4.0 }"#).unwrap_err();
        assert!(err.to_string().contains("sweep_distance"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = RevealConfig::from_json("{ sweep_distance: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RevealConfig::load("/nonexistent/fadein/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("fadein-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "font_size_sp": 24.0 }"#).unwrap();
        let config = RevealConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.font_size_sp, 24.0);
    }
}
